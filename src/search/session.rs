use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

use tokio_util::sync::CancellationToken;

/// Monotonic query generation. Higher is newer.
pub type Revision = u64;

/// Handle to one query revision.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub revision: Revision,
    pub cancel: CancellationToken,
}

/// Tracks which query revision is live and cancels the ones it replaces.
///
/// Every keystroke calls [`SessionControl::supersede`]; a debounced search
/// only goes ahead if its ticket is still current when the timer fires.
#[derive(Debug)]
pub struct SessionControl {
    revision: AtomicU64,
    current: Mutex<CancellationToken>,
}

impl Default for SessionControl {
    fn default() -> Self {
        Self {
            revision: AtomicU64::new(0),
            current: Mutex::new(CancellationToken::new()),
        }
    }
}

impl SessionControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the live revision and starts the next one.
    ///
    /// The revision is bumped while the token lock is held, so concurrent
    /// callers always pair the newest revision with the newest token.
    pub fn supersede(&self) -> Ticket {
        let cancel = CancellationToken::new();

        #[expect(clippy::missing_panics_doc, reason = "no lock poisoning")]
        let mut current = self.current.lock().expect("no lock poisoning");
        let previous = std::mem::replace(&mut *current, cancel.clone());
        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        drop(current);

        previous.cancel();

        Ticket { revision, cancel }
    }

    #[must_use]
    pub fn current_revision(&self) -> Revision {
        self.revision.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        !ticket.cancel.is_cancelled() && ticket.revision == self.current_revision()
    }

    /// Cancels whatever is in flight without starting anything new.
    pub fn cancel(&self) {
        #[expect(clippy::missing_panics_doc, reason = "no lock poisoning")]
        self.current.lock().expect("no lock poisoning").cancel();
    }
}
