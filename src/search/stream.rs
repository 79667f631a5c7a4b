use std::fmt;

use arcstr::ArcStr;
use rootcause::Report;
use tokio::sync::{mpsc, oneshot};

use crate::search::result::{ProviderKind, SearchResult};

/// Capacity of the batch and error channels handed to the consumer.
pub(crate) const STREAM_CAPACITY: usize = 32;

/// One provider's deduplicated contribution to a session.
#[derive(Debug, Clone)]
pub struct ResultBatch {
    pub priority: i32,
    pub provider: ArcStr,
    pub results: Vec<SearchResult>,
}

#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: ArcStr,
    pub kind: ProviderKind,
    pub report: Report,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.report)
    }
}

#[derive(Debug)]
pub enum SearchEvent {
    Batch(ResultBatch),
    Error(ProviderFailure),
    /// Every provider finished; nothing else will arrive.
    Done,
    /// The session was cancelled before it finished.
    Cancelled,
}

impl SearchEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchEvent::Done | SearchEvent::Cancelled)
    }
}

/// Receiving half of a search session.
///
/// The registry's collector owns the senders. It closes `batches` and
/// `errors` before it signals `done`; when the session is cancelled it drops
/// `done` without signalling.
#[derive(Debug)]
pub struct SearchStreams {
    pub batches: mpsc::Receiver<ResultBatch>,
    pub errors: mpsc::Receiver<ProviderFailure>,
    pub done: oneshot::Receiver<()>,
    finished: bool,
}

pub(crate) struct StreamSenders {
    pub batches: mpsc::Sender<ResultBatch>,
    pub errors: mpsc::Sender<ProviderFailure>,
    pub done: oneshot::Sender<()>,
}

impl StreamSenders {
    /// Closes both data channels, then signals completion.
    pub fn finish(self) {
        let Self {
            batches,
            errors,
            done,
        } = self;
        drop(batches);
        drop(errors);
        // The receiver may already be gone; nobody is left to tell.
        let _ = done.send(());
    }
}

pub(crate) fn channel() -> (StreamSenders, SearchStreams) {
    let (batches_tx, batches_rx) = mpsc::channel(STREAM_CAPACITY);
    let (errors_tx, errors_rx) = mpsc::channel(STREAM_CAPACITY);
    let (done_tx, done_rx) = oneshot::channel();

    (
        StreamSenders {
            batches: batches_tx,
            errors: errors_tx,
            done: done_tx,
        },
        SearchStreams {
            batches: batches_rx,
            errors: errors_rx,
            done: done_rx,
            finished: false,
        },
    )
}

impl SearchStreams {
    /// Waits for the next event of the session.
    ///
    /// Buffered batches come first, then buffered errors, then the terminal
    /// [`SearchEvent::Done`] or [`SearchEvent::Cancelled`]. Returns `None`
    /// once the terminal event was handed out.
    pub async fn next_event(&mut self) -> Option<SearchEvent> {
        if self.finished {
            return None;
        }

        let event = tokio::select! {
            biased;
            Some(batch) = self.batches.recv() => SearchEvent::Batch(batch),
            Some(failure) = self.errors.recv() => SearchEvent::Error(failure),
            done = &mut self.done => match done {
                Ok(()) => SearchEvent::Done,
                Err(_) => SearchEvent::Cancelled,
            },
        };

        self.finished = event.is_terminal();
        Some(event)
    }

    /// Drains the session into a vector, terminal event included.
    pub async fn collect(mut self) -> Vec<SearchEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }

        events
    }
}
