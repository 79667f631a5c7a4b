use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use crate::{apps::App, fs::config::Configuration};

pub type AppList = Box<[App]>;

#[cfg(target_os = "macos")]
pub(crate) const APPLICATION_DIRS: [&str; 6] = [
    "/Applications",
    "/Applications/Utilities",
    "/System/Applications",
    "/System/Applications/Utilities",
    "/System/Library/CoreServices/Applications",
    "~/Applications",
];

#[cfg(target_os = "macos")]
pub(crate) const APPLICATIONS: [&str; 1] = ["/System/Library/CoreServices/Finder.app"];

#[cfg(target_os = "windows")]
pub(crate) const APPLICATION_DIRS: [&str; 2] = ["C:\\Program Files", "C:\\Program Files (x86)"];

#[cfg(target_os = "windows")]
pub(crate) const APPLICATIONS: [&str; 0] = [];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub(crate) const APPLICATION_DIRS: [&str; 3] = [
    "/usr/share/applications",
    "/usr/local/share/applications",
    "~/.local/share/applications",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub(crate) const APPLICATIONS: [&str; 0] = [];

/// File extension of a launchable application on this platform.
pub(crate) const APP_EXTENSION: &str = if cfg!(target_os = "macos") {
    "app"
} else if cfg!(target_os = "windows") {
    "exe"
} else {
    "desktop"
};

#[inline]
#[must_use]
pub fn is_app_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == APP_EXTENSION)
}

/// Expands a leading `~/` to the home directory.
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Display name of the app at `path`. `.desktop` entries carry their own
/// `Name=`, everything else is named after the file stem.
#[must_use]
pub fn app_name(path: &Path) -> Option<String> {
    if path.extension().is_some_and(|ext| ext == "desktop")
        && let Some(name) = std::fs::read_to_string(path)
            .ok()
            .and_then(|entry| desktop_entry_name(&entry))
    {
        return Some(name);
    }

    path.file_stem()
        .map(OsStr::to_os_string)
        .and_then(|stem| stem.into_string().ok())
}

/// `Name=` of the `[Desktop Entry]` group, `None` for hidden entries.
fn desktop_entry_name(entry: &str) -> Option<String> {
    let mut in_entry = false;
    let mut name = None;

    for line in entry.lines().map(str::trim) {
        if line.starts_with('[') {
            in_entry = line == "[Desktop Entry]";
            continue;
        }
        if !in_entry {
            continue;
        }

        if let Some(value) = line.strip_prefix("Name=") {
            name.get_or_insert_with(|| value.trim().to_string());
        } else if line == "NoDisplay=true" || line == "Hidden=true" {
            return None;
        }
    }

    name
}

/// Scans the configured directories and explicit paths.
pub fn apps(config: &Configuration) -> AppList {
    let explicit = config.applications.iter().map(|path| expand_home(path));

    let mut apps: Vec<App> = config
        .application_dirs
        .iter()
        .filter_map(|dir| std::fs::read_dir(expand_home(dir)).ok())
        .flatten()
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_app_path(path))
        .chain(explicit.filter(|path| path.exists()))
        .filter_map(|path| app_name(&path).map(|name| App::new(name, path)))
        .collect();

    apps.sort();
    apps.dedup_by(|a, b| a.path == b.path);

    tracing::debug!(count = apps.len(), "scanned applications");

    apps.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_entry_name_reads_main_group() {
        let entry = "[Desktop Entry]\nType=Application\nName=Firefox\nName[de]=Feuerfuchs\n\n[Desktop Action new-window]\nName=New Window\n";
        assert_eq!(desktop_entry_name(entry).as_deref(), Some("Firefox"));
    }

    #[test]
    fn hidden_desktop_entries_are_skipped() {
        let entry = "[Desktop Entry]\nName=Helper\nNoDisplay=true\n";
        assert_eq!(desktop_entry_name(entry), None);
    }

    #[test]
    fn scans_configured_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app_path = dir.path().join(format!("Editor.{APP_EXTENSION}"));
        if APP_EXTENSION == "desktop" {
            std::fs::write(&app_path, "[Desktop Entry]\nName=Editor\n").expect("write entry");
        } else {
            std::fs::create_dir(&app_path).expect("create bundle");
        }
        std::fs::write(dir.path().join("notes.txt"), "not an app").expect("write file");

        let config = Configuration {
            application_dirs: vec![dir.path().display().to_string()],
            applications: vec![],
            ..Configuration::default()
        };

        let apps = apps(&config);
        assert_eq!(apps.len(), 1);
        assert_eq!(&**apps[0].name(), "Editor");
        assert_eq!(apps[0].path(), &app_path);
    }
}
