use std::{fmt::Display, path::PathBuf, process::Command};

use rootcause::Report;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Url {
    /// A URL to handle opening files and applications (`file://`)
    File(PathBuf),
    /// A complete web URL, scheme included
    Web(String),
    /// Any other scheme the OS knows how to route
    /// (`x-apple.systempreferences:`, `ms-settings:`, ...)
    Scheme(String),
}

impl Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Url::File(path_buf) => {
                write!(f, "file://{}", path_buf.display())
            }
            Url::Web(url) | Url::Scheme(url) => f.write_str(url),
        }
    }
}

impl Url {
    /// Hands the URL to the platform opener without waiting for it.
    ///
    /// # Errors
    ///
    /// Fails if the opener process could not be spawned.
    pub fn open(&self) -> Result<(), Report> {
        let mut cmd = if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            if matches!(self, Url::Web(_) | Url::Scheme(_)) {
                cmd.arg("-u");
            }
            cmd
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else {
            Command::new("xdg-open")
        };

        match self {
            Url::File(path) => cmd.arg(path),
            Url::Web(url) | Url::Scheme(url) => cmd.arg(url),
        };

        cmd.spawn()?;

        Ok(())
    }
}

impl From<PathBuf> for Url {
    fn from(value: PathBuf) -> Self {
        Self::File(value)
    }
}
