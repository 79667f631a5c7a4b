use std::{
    ffi::OsStr,
    process::Command,
    sync::{Arc, RwLock},
};

use rayon::{
    iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator},
    slice::ParallelSliceMut,
};
use rootcause::Report;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    apps::{App, app_string::AppString, url::Url},
    fs::{
        apps::{AppList, apps},
        config::Configuration,
    },
    search::{Icon, Provider, ProviderKind, ResultAction, SearchResult, result::spawn_detached},
};

/// Installed applications, matched by case-insensitive substring.
pub struct AppsProvider {
    config: Configuration,
    priority: i32,
    index: RwLock<Arc<AppIndex>>,
}

struct AppIndex {
    apps: AppList,
    /// Every grapheme substring of every app name, pointing back into `apps`
    substring_index: scc::HashMap<AppString, Vec<usize>>,
}

impl AppIndex {
    fn build(apps: AppList) -> Self {
        let substring_index: scc::HashMap<AppString, Vec<usize>> = scc::HashMap::new();

        apps.par_iter().enumerate().for_each(|(i, app)| {
            for n in 1..=app.name.grapheme_len() {
                for substr in substrings(&app.name, n) {
                    substring_index
                        .entry_sync(substr.into())
                        .or_default()
                        .push(i);
                }
            }
        });

        Self {
            apps,
            substring_index,
        }
    }

    fn matches(&self, query: &AppString) -> Vec<&App> {
        let Some(mut hits) = self
            .substring_index
            .get_sync(query)
            .map(|entry| entry.get().clone())
        else {
            return Vec::new();
        };

        hits.sort_unstable();
        hits.dedup();

        let mut matched: Vec<&App> = hits.into_iter().filter_map(|i| self.apps.get(i)).collect();

        matched.par_sort_by_cached_key(|app| {
            let (word, offset) = beginning_distance(query, &app.name);
            (query != &app.name, word, offset, app.name.clone())
        });

        matched
    }
}

impl AppsProvider {
    /// Scans the configured application directories.
    #[must_use]
    pub fn new(config: &Configuration) -> Self {
        Self::with_apps(config, apps(config))
    }

    #[must_use]
    pub fn with_apps(config: &Configuration, apps: AppList) -> Self {
        Self {
            config: config.clone(),
            priority: config.priorities.apps,
            index: RwLock::new(Arc::new(AppIndex::build(apps))),
        }
    }

    fn current(&self) -> Arc<AppIndex> {
        self.index.read().expect("no lock poisoning").clone()
    }

    fn replace_apps(&self, new_apps: AppList) {
        if self.current().apps == new_apps {
            return;
        }

        tracing::debug!(count = new_apps.len(), "application list changed, re-indexing");
        let index = Arc::new(AppIndex::build(new_apps));
        *self.index.write().expect("no lock poisoning") = index;
    }
}

/// `gtk-launch <desktop id>`, with the id passed as a single argument.
fn desktop_launch_command(desktop_id: &OsStr) -> Command {
    let mut command = Command::new("gtk-launch");
    command.arg(desktop_id);
    command
}

fn launch_action(app: &App) -> ResultAction {
    let is_desktop_entry = app.path.extension().is_some_and(|ext| ext == "desktop");

    match app.path.file_stem() {
        Some(stem) if is_desktop_entry => {
            let desktop_id = stem.to_os_string();
            ResultAction::Custom(Arc::new(move || {
                spawn_detached(desktop_launch_command(&desktop_id))
            }))
        }
        _ => ResultAction::Open(Url::File(app.path.clone())),
    }
}

impl Provider for AppsProvider {
    fn name(&self) -> &str {
        "Applications"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::App
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, query: &str) -> bool {
        query.chars().any(char::is_alphabetic)
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>, Report> {
        let query = AppString::from(query.trim());
        let index = self.current();

        Ok(index
            .matches(&query)
            .into_iter()
            .map(|app| {
                let path = app.path.display().to_string();
                SearchResult::new(ProviderKind::App, app.name.as_arcstr())
                    .description(path.clone())
                    .path(path)
                    .icon(Icon::Symbol("▣"))
                    .action(launch_action(app))
            })
            .collect())
    }

    fn refresh(&self) {
        self.replace_apps(apps(&self.config));
    }
}

/// All runs of `n` consecutive graphemes in `string`.
#[inline]
#[must_use]
pub fn substrings(string: &str, n: usize) -> Vec<String> {
    let graphemes = string.graphemes(true).collect::<Vec<&str>>();
    if n == 0 || n > graphemes.len() {
        return Vec::new();
    }

    graphemes.windows(n).map(|window| window.concat()).collect()
}

/// Word index and in-word grapheme offset of the first occurrence of
/// `substr` in `name`. Users tend to type from the start of a word
/// ("Ad" or "Ph" for "Adobe Photoshop").
#[inline]
fn beginning_distance(substr: &str, name: &str) -> (usize, usize) {
    let name = name.to_lowercase();
    let Some(byte_pos) = name.find(&substr.to_lowercase()) else {
        return (usize::MAX, usize::MAX);
    };

    let before = &name[..byte_pos];
    let word = before.split_whitespace().count();
    let word = if before.is_empty() || before.ends_with(char::is_whitespace) {
        word
    } else {
        word.saturating_sub(1)
    };
    let partial_word = before.rsplit(char::is_whitespace).next().unwrap_or_default();

    (word, partial_word.graphemes(true).count())
}
