//! Files and folders matched by name under the configured search roots.

use std::path::{Path, PathBuf};

use rootcause::Report;
use walkdir::{DirEntry, WalkDir};

use crate::{
    apps::url::Url,
    fs::config::Configuration,
    search::{Icon, Provider, ProviderKind, ResultAction, SearchResult},
};

/// Entries a single walk reads before it stops looking.
const MAX_VISITED: usize = 50_000;

pub struct FilesProvider {
    roots: Vec<PathBuf>,
    max_depth: usize,
    max_results: usize,
    priority: i32,
}

impl FilesProvider {
    #[must_use]
    pub fn new(config: &Configuration) -> Self {
        Self {
            roots: config.file_search_roots(),
            max_depth: config.file_search_depth,
            max_results: config.file_search_max_results.max(1),
            priority: config.priorities.files,
        }
    }

    /// Spotlight knows about far more than a bounded walk can reach, so it
    /// goes first. The walk covers machines where `mdfind` is missing or
    /// indexing is off.
    #[cfg(target_os = "macos")]
    fn find(&self, query: &str) -> Vec<PathBuf> {
        match spotlight(&self.roots, query) {
            Ok(paths) => paths,
            Err(err) => {
                tracing::warn!(error = %err, "mdfind failed, walking search roots instead");
                walk(&self.roots, self.max_depth, query)
            }
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn find(&self, query: &str) -> Vec<PathBuf> {
        walk(&self.roots, self.max_depth, query)
    }
}

#[cfg(target_os = "macos")]
fn spotlight(roots: &[PathBuf], query: &str) -> Result<Vec<PathBuf>, Report> {
    let mut paths = Vec::new();

    for root in roots.iter().filter(|root| root.is_dir()) {
        let output = std::process::Command::new("mdfind")
            .arg("-onlyin")
            .arg(root)
            .arg("-name")
            .arg(query)
            .output()?;

        if !output.status.success() {
            return Err(rootcause::report!("mdfind exited with {}", output.status));
        }

        paths.extend(
            String::from_utf8_lossy(&output.stdout)
                .lines()
                .filter(|line| !line.is_empty())
                .map(PathBuf::from),
        );
    }

    Ok(paths)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Paths below `roots` whose name contains `query`, ignoring case. Hidden
/// entries are not descended into.
fn walk(roots: &[PathBuf], max_depth: usize, query: &str) -> Vec<PathBuf> {
    let query = query.to_lowercase();
    let mut matches = Vec::new();
    let mut visited = 0;

    for root in roots {
        let entries = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            // Roots themselves may be hidden, e.g. temporary directories
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in entries {
            visited += 1;
            if visited > MAX_VISITED {
                tracing::debug!(query, "file walk stopped after {MAX_VISITED} entries");
                return matches;
            }

            let Ok(entry) = entry else {
                continue;
            };

            if entry
                .file_name()
                .to_string_lossy()
                .to_lowercase()
                .contains(&query)
            {
                matches.push(entry.into_path());
            }
        }
    }

    matches
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Names starting with the query first, then shallower paths, then by name.
fn rank(mut paths: Vec<PathBuf>, query: &str, limit: usize) -> Vec<PathBuf> {
    let query = query.to_lowercase();

    paths.sort();
    paths.dedup();
    paths.sort_by_cached_key(|path| {
        let name = file_name(path).to_lowercase();
        (!name.starts_with(&query), path.components().count(), name)
    });
    paths.truncate(limit);

    paths
}

fn to_result(path: &Path) -> SearchResult {
    let description = path
        .parent()
        .and_then(Path::file_name)
        .map_or_else(
            || path.display().to_string(),
            |parent| format!("in {}", parent.to_string_lossy()),
        );
    let icon = if path.is_dir() { "▸" } else { "▤" };

    SearchResult::new(ProviderKind::File, file_name(path))
        .description(description)
        .path(path.display().to_string())
        .icon(Icon::Symbol(icon))
        .action(ResultAction::Open(Url::File(path.to_path_buf())))
}

impl Provider for FilesProvider {
    fn name(&self) -> &str {
        "Files"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::File
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, query: &str) -> bool {
        query.trim().chars().count() >= 3
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>, Report> {
        let query = query.trim();

        Ok(rank(self.find(query), query, self.max_results)
            .iter()
            .map(|path| to_result(path))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        for sub in ["notes/2024", "notes/.git", "projects/scout/src/deep/deeper"] {
            fs::create_dir_all(root.join(sub)).expect("create dirs");
        }
        for file in [
            "Report.pdf",
            "notes/report-draft.md",
            "notes/2024/old report.txt",
            "notes/.git/report",
            "projects/scout/src/deep/deeper/report.rs",
            "projects/readme.md",
        ] {
            fs::write(root.join(file), b"").expect("write file");
        }

        dir
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|path| file_name(path)).collect()
    }

    #[test]
    fn walk_matches_names_ignoring_case() {
        let dir = tree();
        let roots = vec![dir.path().to_path_buf()];

        let found = rank(walk(&roots, 3, "REPORT"), "REPORT", 20);
        assert_eq!(
            names(&found),
            vec!["Report.pdf", "report-draft.md", "old report.txt"]
        );
    }

    #[test]
    fn walk_respects_depth_and_skips_hidden_entries() {
        let dir = tree();
        let roots = vec![dir.path().to_path_buf()];

        let shallow = walk(&roots, 1, "report");
        assert_eq!(names(&shallow), vec!["Report.pdf"]);

        let everything = walk(&roots, 10, "report");
        assert!(names(&everything).contains(&"report.rs".to_string()));
        assert!(!everything.iter().any(|path| path.components().any(|c| c.as_os_str() == ".git")));
    }

    #[test]
    fn missing_roots_are_ignored() {
        let found = walk(&[PathBuf::from("/nonexistent/scout/files")], 4, "report");
        assert!(found.is_empty());
    }

    #[test]
    fn rank_prefers_prefix_matches_and_caps_the_list() {
        let paths = vec![
            PathBuf::from("/a/b/c/report.txt"),
            PathBuf::from("/a/old report.txt"),
            PathBuf::from("/a/report.txt"),
            PathBuf::from("/a/report.txt"),
        ];

        let ranked = rank(paths, "rep", 2);
        assert_eq!(
            ranked,
            vec![PathBuf::from("/a/report.txt"), PathBuf::from("/a/b/c/report.txt")]
        );
    }

    #[test]
    fn results_open_the_file() {
        let dir = tree();
        let path = dir.path().join("notes/report-draft.md");
        let result = to_result(&path);

        assert_eq!(result.kind, ProviderKind::File);
        assert_eq!(result.title, "report-draft.md");
        assert_eq!(result.description, "in notes");
        assert_eq!(result.path, path.display().to_string());
        assert!(matches!(result.action, Some(ResultAction::Open(Url::File(ref p))) if *p == path));
    }

    #[test]
    fn needs_three_characters() {
        let files = FilesProvider::new(&Configuration::default());
        assert!(!files.can_handle("re"));
        assert!(!files.can_handle("  re  "));
        assert!(files.can_handle("rep"));
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn search_walks_configured_roots() {
        let dir = tree();
        let config = Configuration {
            file_search_roots: vec![dir.path().display().to_string()],
            file_search_depth: 2,
            file_search_max_results: 2,
            ..Configuration::default()
        };

        let results = FilesProvider::new(&config)
            .search("report")
            .expect("search succeeds");
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Report.pdf", "report-draft.md"]);
    }
}
