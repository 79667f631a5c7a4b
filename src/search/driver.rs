use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::search::{
    registry::Registry,
    session::{SessionControl, Ticket},
    view::UiUpdate,
};

/// Debounced, cancel-on-supersede search loop.
///
/// Each call to [`SearchLoop::input_changed`] supersedes the previous
/// revision. Whatever the search produces is forwarded, tagged with its
/// revision, to the single UI-side receiver returned by [`SearchLoop::new`].
pub struct SearchLoop {
    registry: Arc<Registry>,
    control: Arc<SessionControl>,
    delay: Duration,
    updates: mpsc::UnboundedSender<UiUpdate>,
}

impl SearchLoop {
    #[must_use]
    pub fn new(
        registry: Arc<Registry>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<UiUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();

        (
            Self {
                registry,
                control: Arc::new(SessionControl::new()),
                delay,
                updates,
            },
            rx,
        )
    }

    #[must_use]
    pub fn control(&self) -> &Arc<SessionControl> {
        &self.control
    }

    /// Called on every keystroke. Must be called from within a Tokio runtime.
    pub fn input_changed(&self, query: impl Into<String>) -> JoinHandle<()> {
        let ticket = self.control.supersede();
        let _ = self.updates.send(UiUpdate::Debouncing {
            revision: ticket.revision,
        });

        tokio::spawn(run_revision(
            self.registry.clone(),
            self.control.clone(),
            ticket,
            query.into(),
            self.delay,
            self.updates.clone(),
        ))
    }

    /// Stops whatever is in flight, e.g. when the launcher is dismissed.
    pub fn cancel(&self) {
        self.control.cancel();
    }
}

async fn run_revision(
    registry: Arc<Registry>,
    control: Arc<SessionControl>,
    ticket: Ticket,
    query: String,
    delay: Duration,
    updates: mpsc::UnboundedSender<UiUpdate>,
) {
    tokio::select! {
        biased;
        () = ticket.cancel.cancelled() => return,
        () = tokio::time::sleep(delay) => {}
    }

    if !control.is_current(&ticket) {
        return;
    }

    let revision = ticket.revision;
    if updates
        .send(UiUpdate::Dispatching {
            revision,
            query: query.clone(),
        })
        .is_err()
    {
        return;
    }

    let mut streams = registry.search_async(&query, ticket.cancel.clone());
    while let Some(event) = streams.next_event().await {
        if updates.send(UiUpdate::Event { revision, event }).is_err() {
            ticket.cancel.cancel();
            return;
        }
    }
}
