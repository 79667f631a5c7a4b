//! One-shot search for `scout --query`, printed to stdout.

use std::{io::Write, sync::Arc, time::Duration};

use crate::search::{
    Registry,
    driver::SearchLoop,
    view::{Placeholder, ResultView, SearchPhase},
};

/// Runs `query` through the same debounced loop the launcher uses and
/// returns the settled view.
pub async fn search(
    registry: Arc<Registry>,
    query: &str,
    delay: Duration,
    max_results: usize,
) -> ResultView {
    let (search, mut updates) = SearchLoop::new(registry, delay);
    let mut view = ResultView::new().with_max_results(max_results);

    search.input_changed(query);

    while let Some(update) = updates.recv().await {
        view.apply(update);
        if matches!(view.phase(), SearchPhase::Completed | SearchPhase::Cancelled) {
            break;
        }
    }

    view
}

/// # Errors
///
/// Fails when `out` cannot be written to.
pub fn print(view: &ResultView, out: &mut impl Write) -> std::io::Result<()> {
    match view.placeholder() {
        Placeholder::NoResults => return writeln!(out, "No results found"),
        Placeholder::Error(err) => return writeln!(out, "Error: {err}"),
        Placeholder::None => {}
    }

    for result in view.results() {
        if result.description.is_empty() {
            writeln!(out, "[{}] {}", result.kind, result.title)?;
        } else {
            writeln!(out, "[{}] {} ({})", result.kind, result.title, result.description)?;
        }
    }

    Ok(())
}
