use rootcause::Report;

use crate::search::result::{ProviderKind, SearchResult};

#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("{provider} cannot execute {found} results (it handles {expected})")]
    UnsupportedKind {
        provider: String,
        expected: ProviderKind,
        found: ProviderKind,
    },
    #[error("no provider registered for {kind} results")]
    NoProvider { kind: ProviderKind },
    #[error("action failed: {0}")]
    Action(Report),
}

/// A pluggable source of search results.
///
/// Implementations are shared across worker tasks, so every method takes
/// `&self`. Only [`Provider::search`] may block.
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// Lower values are shown first.
    fn priority(&self) -> i32;

    /// Cheap admissibility check, called on the dispatching task before any
    /// work is spawned. Must not block.
    fn can_handle(&self, query: &str) -> bool;

    /// # Errors
    ///
    /// Any failure is contained to this provider's contribution to the
    /// current search.
    fn search(&self, query: &str) -> Result<Vec<SearchResult>, Report>;

    /// Performs the action bound to `result`.
    ///
    /// # Errors
    ///
    /// [`ExecuteError::UnsupportedKind`] if `result` was produced by a
    /// provider of another kind, [`ExecuteError::Action`] if the action
    /// itself failed.
    fn execute(&self, result: &SearchResult) -> Result<(), ExecuteError> {
        if result.kind != self.kind() {
            return Err(ExecuteError::UnsupportedKind {
                provider: self.name().to_owned(),
                expected: self.kind(),
                found: result.kind,
            });
        }

        result.run_action().map_err(ExecuteError::Action)
    }

    /// Reloads provider-internal data (app lists, command files, ...).
    fn refresh(&self) {}
}
