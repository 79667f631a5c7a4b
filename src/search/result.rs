use std::{fmt, io::Write, process::Command, process::Stdio, sync::Arc};

use arcstr::ArcStr;
use rootcause::{Report, report};
use serde::{Deserialize, Serialize};

use crate::apps::url::Url;

/// Category of a provider. Results carry the kind of the provider that
/// produced them, which is how [`crate::search::Registry::execute_result`]
/// routes them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    App,
    File,
    Calculator,
    Web,
    System,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::App => "app",
            ProviderKind::File => "file",
            ProviderKind::Calculator => "calculator",
            ProviderKind::Web => "web",
            ProviderKind::System => "system",
        };

        f.write_str(name)
    }
}

/// Opaque icon handle. Only the UI looks inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    /// A short glyph drawn in place of an image
    Symbol(&'static str),
    /// Encoded PNG bytes
    Png(Arc<[u8]>),
}

pub type CustomAction = Arc<dyn Fn() -> Result<(), Report> + Send + Sync>;

/// The one thing a result does when the user confirms it.
#[derive(Clone)]
pub enum ResultAction {
    Open(Url),
    /// Run through `sh -c`, detached
    Shell(String),
    /// Put text on the system clipboard
    Copy(String),
    Custom(CustomAction),
}

impl fmt::Debug for ResultAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultAction::Open(url) => f.debug_tuple("Open").field(url).finish(),
            ResultAction::Shell(cmd) => f.debug_tuple("Shell").field(cmd).finish(),
            ResultAction::Copy(text) => f.debug_tuple("Copy").field(text).finish(),
            ResultAction::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl ResultAction {
    /// # Errors
    ///
    /// Fails when the underlying process could not be spawned or the custom
    /// action reported an error.
    pub fn run(&self) -> Result<(), Report> {
        match self {
            ResultAction::Open(url) => url.open(),
            ResultAction::Shell(command) => {
                let mut sh = Command::new("sh");
                sh.arg("-c").arg(command);
                spawn_detached(sh)
            }
            ResultAction::Copy(text) => copy_to_clipboard(text),
            ResultAction::Custom(action) => action(),
        }
    }
}

/// Spawns `command` without waiting for it. Its exit status is logged from a
/// helper thread.
///
/// # Errors
///
/// Fails when the process could not be spawned.
pub fn spawn_detached(mut command: Command) -> Result<(), Report> {
    let mut child = command.stdin(Stdio::null()).spawn()?;

    let program = command.get_program().to_string_lossy().into_owned();
    std::thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => {
            tracing::warn!(%program, %status, "command exited unsuccessfully");
        }
        Err(err) => tracing::warn!(%program, error = %err, "command failed"),
        Ok(_) => {}
    });

    Ok(())
}

fn copy_to_clipboard(text: &str) -> Result<(), Report> {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("pbcopy")
    } else if cfg!(target_os = "windows") {
        Command::new("clip")
    } else {
        Command::new("wl-copy")
    };

    let mut child = cmd.stdin(Stdio::piped()).spawn()?;
    child
        .stdin
        .take()
        .ok_or_else(|| report!("clipboard helper has no stdin"))?
        .write_all(text.as_bytes())?;

    let status = child.wait()?;
    if !status.success() {
        return Err(report!("clipboard helper exited with {status}"));
    }

    Ok(())
}

/// Current text on the system clipboard. Empty when it holds no text.
///
/// # Errors
///
/// Fails when the clipboard helper could not be run.
pub fn read_clipboard() -> Result<String, Report> {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("pbpaste")
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("powershell");
        cmd.args(["-NoProfile", "-Command", "Get-Clipboard"]);
        cmd
    } else {
        let mut cmd = Command::new("wl-paste");
        cmd.arg("--no-newline");
        cmd
    };

    let output = cmd.stdin(Stdio::null()).output()?;
    if !output.status.success() {
        // wl-paste exits non-zero on an empty clipboard
        tracing::debug!(status = %output.status, "clipboard helper returned no text");
        return Ok(String::new());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Identity of a result within one search session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultKey {
    pub kind: ProviderKind,
    pub path: ArcStr,
}

/// A single entry produced by a provider.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub title: ArcStr,
    pub description: ArcStr,
    /// Display hint, and half of the dedup key
    pub path: ArcStr,
    pub icon: Option<Icon>,
    pub kind: ProviderKind,
    pub action: Option<ResultAction>,
}

impl SearchResult {
    #[must_use]
    pub fn new(kind: ProviderKind, title: impl Into<ArcStr>) -> Self {
        Self {
            title: title.into(),
            description: ArcStr::new(),
            path: ArcStr::new(),
            icon: None,
            kind,
            action: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<ArcStr>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    #[must_use]
    pub fn action(mut self, action: ResultAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn key(&self) -> ResultKey {
        ResultKey {
            kind: self.kind,
            path: self.path.clone(),
        }
    }

    /// Runs the bound action, if any.
    ///
    /// # Errors
    ///
    /// Propagates the action's failure.
    pub fn run_action(&self) -> Result<(), Report> {
        self.action.as_ref().map_or(Ok(()), ResultAction::run)
    }
}
