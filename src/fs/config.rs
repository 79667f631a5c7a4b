use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use rootcause::{Report, report};
use serde::{Deserialize, Serialize};

use crate::fs::apps::{APPLICATION_DIRS, APPLICATIONS, expand_home};

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub open_search_hotkey: HotkeyString,
    pub launch_on_boot: bool,
    /// Quiet period after the last keystroke before a search starts
    pub search_delay_ms: u64,
    /// Deadline for a single provider search; `0` disables it
    pub provider_timeout_ms: u64,
    /// `0` shows every result
    pub max_results: usize,
    pub application_dirs: Vec<String>,
    pub applications: Vec<String>,
    /// Defaults to `<config dir>/Scout/commands`
    pub commands_dir: Option<PathBuf>,
    pub web_search_engine: String,
    /// Directories searched by file name, `~/` allowed
    pub file_search_roots: Vec<String>,
    /// Directory levels below each root the file walk descends into
    pub file_search_depth: usize,
    pub file_search_max_results: usize,
    pub priorities: Priorities,
}

/// Format is "[Modifiers]-Key"
/// Key is a key code in a string format defined in [`global_hotkey::hotkey::Code`]
///
/// Examples:
///   - alt-space
///   - ctrl-win-KeyC
pub type HotkeyString = String;

/// Provider ordering. Lower comes first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Priorities {
    pub calculator: i32,
    pub commands: i32,
    pub encode_decode: i32,
    pub system_settings: i32,
    pub apps: i32,
    pub files: i32,
    pub web: i32,
}

impl Default for Priorities {
    fn default() -> Self {
        Self {
            calculator: 10,
            commands: 20,
            encode_decode: 30,
            system_settings: 50,
            apps: 100,
            files: 200,
            web: 1000,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            open_search_hotkey: "alt-space".to_string(),
            launch_on_boot: true,
            search_delay_ms: 50,
            provider_timeout_ms: 3000,
            max_results: 50,
            application_dirs: APPLICATION_DIRS.iter().map(ToString::to_string).collect(),
            applications: APPLICATIONS.iter().map(ToString::to_string).collect(),
            commands_dir: None,
            web_search_engine: "google".to_string(),
            file_search_roots: ["~/Desktop", "~/Documents", "~/Downloads"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            file_search_depth: 4,
            file_search_max_results: 20,
            priorities: Priorities::default(),
        }
    }
}

impl Configuration {
    /// Platform config directory for Scout, e.g. `~/.config/Scout`.
    #[must_use]
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|mut dir| {
            dir.push(crate::APP_NAME);
            dir
        })
    }

    /// Loads `path`, or the default location when `None`. A missing file
    /// yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, Report> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::dir() {
                Some(dir) => dir.join(CONFIG_FILE_NAME),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        Self::parse(&raw).map_err(|err| err.attach(format!("while reading {}", path.display())))
    }

    /// # Errors
    ///
    /// Fails on malformed TOML or mistyped fields.
    pub fn parse(raw: &str) -> Result<Self, Report> {
        toml::from_str(raw).map_err(|err| report!("invalid configuration: {err}"))
    }

    #[must_use]
    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    #[must_use]
    pub fn provider_timeout(&self) -> Option<Duration> {
        (self.provider_timeout_ms > 0).then(|| Duration::from_millis(self.provider_timeout_ms))
    }

    #[must_use]
    pub fn commands_dir(&self) -> Option<PathBuf> {
        self.commands_dir
            .clone()
            .or_else(|| Self::dir().map(|dir| dir.join("commands")))
    }

    #[must_use]
    pub fn file_search_roots(&self) -> Vec<PathBuf> {
        self.file_search_roots
            .iter()
            .map(|root| expand_home(root))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Configuration::parse(
            r#"
            search_delay_ms = 120

            [priorities]
            web = 5
            "#,
        )
        .expect("valid config");

        assert_eq!(config.search_delay(), Duration::from_millis(120));
        assert_eq!(config.priorities.web, 5);
        assert_eq!(config.priorities.calculator, Priorities::default().calculator);
        assert_eq!(config.open_search_hotkey, "alt-space");
    }

    #[test]
    fn zero_timeout_disables_the_deadline() {
        let config = Configuration::parse("provider_timeout_ms = 0").expect("valid config");
        assert_eq!(config.provider_timeout(), None);
        assert_eq!(
            Configuration::default().provider_timeout(),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn file_search_roots_expand_home() {
        let config = Configuration::parse(
            r#"
            file_search_roots = ["~/notes", "/srv/share"]
            file_search_depth = 2
            "#,
        )
        .expect("valid config");

        let roots = config.file_search_roots();
        assert_eq!(roots[1], PathBuf::from("/srv/share"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(roots[0], home.join("notes"));
        }
        assert_eq!(config.file_search_depth, 2);
        assert_eq!(config.file_search_max_results, 20);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Configuration::parse("search_delay_ms = \"soon\"").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config =
            Configuration::load(Some(&dir.path().join("absent.toml"))).expect("defaults");
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn load_reads_the_given_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&path).expect("create config");
        writeln!(file, "web_search_engine = \"ddg\"").expect("write config");

        let config = Configuration::load(Some(&path)).expect("valid config");
        assert_eq!(config.web_search_engine, "ddg");
    }
}
