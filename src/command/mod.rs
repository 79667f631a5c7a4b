use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use rootcause::Report;
use serde::{Deserialize, Serialize};
use trie_rs::map::{Trie, TrieBuilder};

use crate::{apps::url::Url, search::ResultAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandActionType {
    Shell,
    Url,
    Application,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAction {
    #[serde(rename = "type")]
    pub kind: CommandActionType,
    #[serde(default)]
    pub command: String,
    /// Overrides `command` for [`CommandActionType::Application`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Overrides `command` for [`CommandActionType::Url`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CommandAction {
    #[must_use]
    pub fn to_result_action(&self) -> ResultAction {
        match self.kind {
            CommandActionType::Shell => ResultAction::Shell(self.command.clone()),
            CommandActionType::Url => {
                ResultAction::Open(Url::Web(self.url.clone().unwrap_or_else(|| self.command.clone())))
            }
            CommandActionType::Application => ResultAction::Open(Url::File(PathBuf::from(
                self.path.as_deref().unwrap_or(&self.command),
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    pub trigger: String,
    #[serde(default)]
    pub description: String,
    pub action: CommandAction,
}

/// One command file: a named group of commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl CommandGroup {
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not a valid command group.
    pub fn load(path: &Path) -> Result<Self, Report> {
        let raw = std::fs::read_to_string(path)?;
        let group = serde_json::from_str(&raw)?;
        Ok(group)
    }

    fn builtin() -> Self {
        let web = |name: &str, trigger: &str, url: &str| Command {
            name: name.to_string(),
            trigger: trigger.to_string(),
            description: format!("Open {url}"),
            action: CommandAction {
                kind: CommandActionType::Url,
                command: url.to_string(),
                path: None,
                url: None,
            },
        };

        Self {
            name: "Built-in".to_string(),
            description: String::new(),
            commands: vec![
                web("Hacker News", "hn", "https://news.ycombinator.com"),
                web("GitHub", "gh", "https://github.com"),
            ],
        }
    }
}

/// Reads every `*.json` group in `dir`. Unreadable files are skipped.
#[must_use]
pub fn load_dir(dir: &Path) -> Vec<CommandGroup> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "no commands directory");
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| match CommandGroup::load(&path) {
            Ok(group) => Some(group),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to load commands");
                None
            }
        })
        .collect()
}

/// Commands keyed by lowercase trigger.
pub struct CommandTrie {
    inner: Trie<u8, Vec<Command>>,
    len: usize,
}

impl Default for CommandTrie {
    fn default() -> Self {
        Self::build(std::iter::empty())
    }
}

impl CommandTrie {
    /// Indexes the built-in commands followed by `groups`.
    pub fn build(groups: impl IntoIterator<Item = CommandGroup>) -> Self {
        let mut by_trigger: BTreeMap<String, Vec<Command>> = BTreeMap::new();
        let mut len = 0;

        for command in std::iter::once(CommandGroup::builtin())
            .chain(groups)
            .flat_map(|group| group.commands)
        {
            len += 1;
            by_trigger
                .entry(command.trigger.to_lowercase())
                .or_default()
                .push(command);
        }

        let mut builder = TrieBuilder::new();
        for (trigger, commands) in by_trigger {
            builder.push(trigger, commands);
        }

        Self {
            inner: builder.build(),
            len,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Commands whose trigger starts with `query`, then commands whose
    /// trigger is a prefix of `query`.
    #[must_use]
    pub fn matches(&self, query: &str) -> Vec<&Command> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let extending: Vec<(String, &Vec<Command>)> =
            self.inner.predictive_search(&query).collect();
        let prefixes: Vec<(String, &Vec<Command>)> =
            self.inner.common_prefix_search(&query).collect();

        let mut seen = std::collections::HashSet::new();
        extending
            .into_iter()
            .chain(prefixes)
            .filter(|(trigger, _)| seen.insert(trigger.clone()))
            .flat_map(|(_, commands)| commands.iter())
            .collect()
    }

    #[must_use]
    pub fn has_match(&self, query: &str) -> bool {
        !self.matches(query).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(commands: &[&Command]) -> Vec<String> {
        commands.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn builtins_are_always_present() {
        let trie = CommandTrie::default();
        assert_eq!(trie.len(), 2);
        assert_eq!(names(&trie.matches("hn")), vec!["Hacker News"]);
        assert_eq!(names(&trie.matches("GH")), vec!["GitHub"]);
    }

    #[test]
    fn matches_prefixes_both_ways() {
        let group: CommandGroup = serde_json::from_str(
            r#"{
                "name": "dev",
                "commands": [
                    { "name": "Deploy", "trigger": "deploy", "action": { "type": "shell", "command": "make deploy" } },
                    { "name": "Docs", "trigger": "docs", "action": { "type": "url", "command": "https://docs.rs" } }
                ]
            }"#,
        )
        .expect("valid group");
        let trie = CommandTrie::build([group]);

        assert_eq!(names(&trie.matches("d")), vec!["Deploy", "Docs"]);
        assert_eq!(names(&trie.matches("dep")), vec!["Deploy"]);
        assert_eq!(names(&trie.matches("deploy staging")), vec!["Deploy"]);
        assert!(trie.matches("x").is_empty());
        assert!(!trie.has_match("   "));
    }

    #[test]
    fn actions_map_to_result_actions() {
        let action = CommandAction {
            kind: CommandActionType::Application,
            command: "/Applications/Notes.app".to_string(),
            path: None,
            url: None,
        };
        assert!(matches!(
            action.to_result_action(),
            ResultAction::Open(Url::File(path)) if path == Path::new("/Applications/Notes.app")
        ));

        let action = CommandAction {
            kind: CommandActionType::Url,
            command: "ignored".to_string(),
            path: None,
            url: Some("https://example.com".to_string()),
        };
        assert!(matches!(
            action.to_result_action(),
            ResultAction::Open(Url::Web(url)) if url == "https://example.com"
        ));
    }

    #[test]
    fn load_dir_skips_broken_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("tools.json"),
            r#"{ "name": "tools", "commands": [
                { "name": "Top", "trigger": "top", "action": { "type": "shell", "command": "top" } }
            ] }"#,
        )
        .expect("write group");
        std::fs::write(dir.path().join("broken.json"), "{ not json").expect("write broken");
        std::fs::write(dir.path().join("readme.txt"), "ignored").expect("write text");

        let groups = load_dir(dir.path());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].commands[0].trigger, "top");
    }
}
