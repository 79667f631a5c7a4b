use std::{
    path::PathBuf,
    sync::{Arc, RwLock},
};

use rootcause::Report;

use crate::{
    command::{CommandTrie, load_dir},
    search::{Icon, Provider, ProviderKind, SearchResult},
};

/// Built-in and user-defined commands, matched by trigger.
pub struct CommandsProvider {
    dir: Option<PathBuf>,
    priority: i32,
    trie: RwLock<Arc<CommandTrie>>,
}

impl CommandsProvider {
    /// Loads the command files in `dir`, if any.
    #[must_use]
    pub fn new(dir: Option<PathBuf>, priority: i32) -> Self {
        let trie = Self::load(dir.as_ref());

        Self {
            dir,
            priority,
            trie: RwLock::new(Arc::new(trie)),
        }
    }

    fn load(dir: Option<&PathBuf>) -> CommandTrie {
        let trie = CommandTrie::build(dir.map(|dir| load_dir(dir)).unwrap_or_default());
        tracing::debug!(commands = trie.len(), "loaded commands");
        trie
    }

    fn current(&self) -> Arc<CommandTrie> {
        self.trie.read().expect("no lock poisoning").clone()
    }
}

impl Provider for CommandsProvider {
    fn name(&self) -> &str {
        "Commands"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::System
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, query: &str) -> bool {
        self.current().has_match(query)
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>, Report> {
        Ok(self
            .current()
            .matches(query)
            .into_iter()
            .map(|command| {
                SearchResult::new(ProviderKind::System, command.name.as_str())
                    .description(command.description.as_str())
                    .path(command.name.as_str())
                    .icon(Icon::Symbol("›"))
                    .action(command.action.to_result_action())
            })
            .collect())
    }

    fn refresh(&self) {
        let trie = Self::load(self.dir.as_ref());
        *self.trie.write().expect("no lock poisoning") = Arc::new(trie);
    }
}
