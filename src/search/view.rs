use std::collections::BTreeMap;

use tracing::debug;

use crate::search::{
    result::SearchResult,
    session::Revision,
    stream::{ResultBatch, SearchEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Debouncing,
    Dispatching,
    Streaming,
    Completed,
    Cancelled,
}

/// Message crossing from search tasks into the UI loop.
#[derive(Debug)]
pub enum UiUpdate {
    /// A keystroke started a new revision
    Debouncing { revision: Revision },
    /// The debounce settled and the registry was queried
    Dispatching { revision: Revision, query: String },
    Event { revision: Revision, event: SearchEvent },
}

impl UiUpdate {
    #[must_use]
    pub fn revision(&self) -> Revision {
        match self {
            UiUpdate::Debouncing { revision }
            | UiUpdate::Dispatching { revision, .. }
            | UiUpdate::Event { revision, .. } => *revision,
        }
    }
}

/// What to show when there is no list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    None,
    NoResults,
    Error(String),
}

/// The consumer's side of a search session.
///
/// Owned by the UI loop, which is its only writer. Results are kept in
/// arrival order in `slots`; `by_priority` remembers which slots each
/// priority contributed so the visible order can be rebuilt whenever a batch
/// lands out of priority order.
#[derive(Debug)]
pub struct ResultView {
    revision: Revision,
    query: String,
    phase: SearchPhase,
    slots: Vec<SearchResult>,
    by_priority: BTreeMap<i32, Vec<usize>>,
    ordered: Vec<usize>,
    selected: usize,
    error: Option<String>,
    max_results: Option<usize>,
}

impl Default for ResultView {
    fn default() -> Self {
        Self {
            revision: 0,
            query: String::new(),
            phase: SearchPhase::Idle,
            slots: Vec::new(),
            by_priority: BTreeMap::new(),
            ordered: Vec::new(),
            selected: 0,
            error: None,
            max_results: None,
        }
    }
}

impl ResultView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of visible rows. Lower-priority results fall off first.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = (max_results > 0).then_some(max_results);
        self
    }

    /// Applies one update. Updates from any revision other than the newest
    /// one seen are dropped. Returns whether anything visible changed.
    pub fn apply(&mut self, update: UiUpdate) -> bool {
        let revision = update.revision();
        if revision < self.revision {
            debug!(revision, current = self.revision, "dropping stale update");
            return false;
        }
        if revision > self.revision {
            self.reset(revision);
        }

        match update {
            UiUpdate::Debouncing { .. } => {
                self.phase = SearchPhase::Debouncing;
                false
            }
            UiUpdate::Dispatching { query, .. } => {
                self.query = query;
                self.phase = SearchPhase::Dispatching;
                self.clear_results()
            }
            UiUpdate::Event { event, .. } => self.apply_event(event),
        }
    }

    fn reset(&mut self, revision: Revision) {
        self.revision = revision;
        self.phase = SearchPhase::Idle;
        self.error = None;
    }

    fn clear_results(&mut self) -> bool {
        let had_results = !self.slots.is_empty();
        self.slots.clear();
        self.by_priority.clear();
        self.ordered.clear();
        self.selected = 0;
        self.error = None;
        had_results
    }

    fn apply_event(&mut self, event: SearchEvent) -> bool {
        if matches!(self.phase, SearchPhase::Completed | SearchPhase::Cancelled) {
            return false;
        }

        match event {
            SearchEvent::Batch(batch) => {
                self.phase = SearchPhase::Streaming;
                self.merge(batch);
                true
            }
            SearchEvent::Error(failure) => {
                self.phase = SearchPhase::Streaming;
                // Errors only matter while nothing else succeeded
                if self.slots.is_empty() && self.error.is_none() {
                    self.error = Some(failure.to_string());
                    true
                } else {
                    false
                }
            }
            SearchEvent::Done => {
                self.phase = SearchPhase::Completed;
                true
            }
            SearchEvent::Cancelled => {
                self.phase = SearchPhase::Cancelled;
                true
            }
        }
    }

    fn merge(&mut self, batch: ResultBatch) {
        let start = self.slots.len();
        self.slots.extend(batch.results);
        self.by_priority
            .entry(batch.priority)
            .or_default()
            .extend(start..self.slots.len());

        self.ordered = self.by_priority.values().flatten().copied().collect();
        if let Some(max) = self.max_results {
            self.ordered.truncate(max);
        }

        // The list was reshuffled; the best match is always the selection.
        self.selected = 0;
        self.error = None;
    }

    #[must_use]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    #[must_use]
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Visible results, highest priority first.
    pub fn results(&self) -> impl Iterator<Item = &SearchResult> {
        self.ordered.iter().map(|&slot| &self.slots[slot])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected(&self) -> Option<&SearchResult> {
        self.ordered.get(self.selected).map(|&slot| &self.slots[slot])
    }

    pub fn select_next(&mut self) {
        if self.ordered.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.ordered.len();
    }

    pub fn select_previous(&mut self) {
        if self.ordered.is_empty() {
            return;
        }
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.ordered.len() - 1);
    }

    #[must_use]
    pub fn placeholder(&self) -> Placeholder {
        if !self.ordered.is_empty() || self.query.trim().is_empty() {
            return Placeholder::None;
        }

        match (&self.error, self.phase) {
            (Some(error), _) => Placeholder::Error(error.clone()),
            (None, SearchPhase::Completed) => Placeholder::NoResults,
            _ => Placeholder::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use arcstr::ArcStr;
    use rootcause::report;

    use super::*;
    use crate::search::{
        result::ProviderKind,
        stream::{ProviderFailure, ResultBatch},
    };

    fn batch(priority: i32, kind: ProviderKind, titles: &[&str]) -> SearchEvent {
        SearchEvent::Batch(ResultBatch {
            priority,
            provider: ArcStr::from("test"),
            results: titles
                .iter()
                .map(|t| SearchResult::new(kind, *t).path(*t))
                .collect(),
        })
    }

    fn failure(provider: &str) -> SearchEvent {
        SearchEvent::Error(ProviderFailure {
            provider: ArcStr::from(provider),
            kind: ProviderKind::File,
            report: report!("boom"),
        })
    }

    fn event(revision: Revision, event: SearchEvent) -> UiUpdate {
        UiUpdate::Event { revision, event }
    }

    fn dispatch(view: &mut ResultView, revision: Revision, query: &str) {
        view.apply(UiUpdate::Debouncing { revision });
        view.apply(UiUpdate::Dispatching {
            revision,
            query: query.to_owned(),
        });
    }

    fn titles(view: &ResultView) -> Vec<String> {
        view.results().map(|r| r.title.to_string()).collect()
    }

    #[test]
    fn late_high_priority_batch_moves_to_the_top() {
        let mut view = ResultView::new();
        dispatch(&mut view, 1, "42");

        view.apply(event(1, batch(10, ProviderKind::Web, &["web"])));
        view.select_next();
        assert_eq!(titles(&view), vec!["web"]);

        view.apply(event(1, batch(1, ProviderKind::Calculator, &["=42"])));
        assert_eq!(titles(&view), vec!["=42", "web"]);
        assert_eq!(view.selected_index(), 0);
        assert_eq!(view.selected().map(|r| r.title.to_string()), Some("=42".into()));
    }

    #[test]
    fn equal_priorities_group_together() {
        let mut view = ResultView::new();
        dispatch(&mut view, 1, "abc");

        view.apply(event(1, batch(5, ProviderKind::App, &["a1"])));
        view.apply(event(1, batch(9, ProviderKind::Web, &["w"])));
        view.apply(event(1, batch(5, ProviderKind::File, &["f1"])));

        assert_eq!(titles(&view), vec!["a1", "f1", "w"]);
    }

    #[test]
    fn stale_revisions_are_ignored() {
        let mut view = ResultView::new();
        dispatch(&mut view, 1, "ab");
        dispatch(&mut view, 2, "abc");

        assert!(!view.apply(event(1, batch(1, ProviderKind::App, &["old"]))));
        assert!(view.is_empty());

        view.apply(event(2, batch(1, ProviderKind::App, &["new"])));
        assert_eq!(titles(&view), vec!["new"]);
    }

    #[test]
    fn error_only_shows_when_nothing_succeeded() {
        let mut view = ResultView::new();
        dispatch(&mut view, 1, "abc");
        view.apply(event(1, failure("files")));
        view.apply(event(1, SearchEvent::Done));
        assert!(matches!(view.placeholder(), Placeholder::Error(msg) if msg.starts_with("files")));

        let mut view = ResultView::new();
        dispatch(&mut view, 1, "abc");
        view.apply(event(1, batch(1, ProviderKind::App, &["ok"])));
        assert!(!view.apply(event(1, failure("files"))));
        view.apply(event(1, SearchEvent::Done));
        assert_eq!(view.placeholder(), Placeholder::None);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn results_arriving_after_an_error_replace_it() {
        let mut view = ResultView::new();
        dispatch(&mut view, 1, "abc");
        view.apply(event(1, failure("files")));
        view.apply(event(1, batch(3, ProviderKind::Web, &["web"])));
        view.apply(event(1, SearchEvent::Done));

        assert_eq!(view.placeholder(), Placeholder::None);
        assert_eq!(titles(&view), vec!["web"]);
    }

    #[test]
    fn no_results_only_after_completion() {
        let mut view = ResultView::new();
        dispatch(&mut view, 1, "zzz");
        assert_eq!(view.placeholder(), Placeholder::None);

        view.apply(event(1, SearchEvent::Done));
        assert_eq!(view.placeholder(), Placeholder::NoResults);
        assert_eq!(view.phase(), SearchPhase::Completed);
    }

    #[test]
    fn empty_query_shows_nothing() {
        let mut view = ResultView::new();
        dispatch(&mut view, 1, "");
        view.apply(event(1, SearchEvent::Done));

        assert_eq!(view.placeholder(), Placeholder::None);
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut view = ResultView::new();
        dispatch(&mut view, 1, "abc");
        view.apply(event(1, batch(1, ProviderKind::App, &["a", "b", "c"])));

        view.select_previous();
        assert_eq!(view.selected_index(), 2);
        view.select_next();
        assert_eq!(view.selected_index(), 0);
        view.select_next();
        assert_eq!(view.selected_index(), 1);
    }

    #[test]
    fn max_results_drops_lowest_priority_rows() {
        let mut view = ResultView::new().with_max_results(2);
        dispatch(&mut view, 1, "abc");
        view.apply(event(1, batch(9, ProviderKind::Web, &["w"])));
        view.apply(event(1, batch(1, ProviderKind::App, &["a", "b"])));

        assert_eq!(titles(&view), vec!["a", "b"]);
    }

    #[test]
    fn nothing_is_merged_after_the_terminal_event() {
        let mut view = ResultView::new();
        dispatch(&mut view, 1, "abc");
        view.apply(event(1, SearchEvent::Cancelled));

        assert!(!view.apply(event(1, batch(1, ProviderKind::App, &["late"]))));
        assert!(view.is_empty());
        assert_eq!(view.phase(), SearchPhase::Cancelled);
    }
}
