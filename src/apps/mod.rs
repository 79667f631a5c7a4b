pub mod app_string;
pub mod url;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use self::app_string::AppString;

pub type AppName = AppString;

/// An installed application found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub(crate) name: AppName,
    pub(crate) path: PathBuf,
}

impl App {
    #[must_use]
    pub fn new(name: impl Into<AppName>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &AppName {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl PartialOrd for App {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for App {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.path.cmp(&other.path)
    }
}
