//! Scriptable providers for exercising the registry and the search loop.

use std::{
    sync::{
        Arc, Condvar, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use rootcause::{Report, report};

use crate::search::{
    provider::{ExecuteError, Provider},
    result::{ProviderKind, SearchResult},
};

/// Blocks provider threads until released (or five seconds pass).
#[derive(Clone, Default)]
pub struct Gate(Arc<(Mutex<bool>, Condvar)>);

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wait(&self) {
        let (lock, cvar) = &*self.0;
        let released = lock.lock().expect("no lock poisoning");
        let _ = cvar
            .wait_timeout_while(released, Duration::from_secs(5), |released| !*released)
            .expect("no lock poisoning");
    }

    pub fn release(&self) {
        let (lock, cvar) = &*self.0;
        *lock.lock().expect("no lock poisoning") = true;
        cvar.notify_all();
    }
}

pub struct StaticProvider {
    name: String,
    kind: ProviderKind,
    priority: i32,
    accepts: fn(&str) -> bool,
    results: Vec<(String, String)>,
    delay: Option<Duration>,
    gate: Option<Gate>,
    failure: Option<String>,
    pub can_handle_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub execute_calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl StaticProvider {
    pub fn new(name: &str, kind: ProviderKind, priority: i32) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            priority,
            accepts: |_| true,
            results: Vec::new(),
            delay: None,
            gate: None,
            failure: None,
            can_handle_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            execute_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// `(title, path)` pairs returned by every search.
    pub fn with_results(mut self, results: &[(&str, &str)]) -> Self {
        self.results = results
            .iter()
            .map(|(title, path)| ((*title).to_owned(), (*path).to_owned()))
            .collect();
        self
    }

    pub fn accepting(mut self, accepts: fn(&str) -> bool) -> Self {
        self.accepts = accepts;
        self
    }

    pub fn rejecting(self) -> Self {
        self.accepting(|_| false)
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn blocking_on(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_owned());
        self
    }
}

impl Provider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, query: &str) -> bool {
        self.can_handle_calls.fetch_add(1, Ordering::SeqCst);
        (self.accepts)(query)
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>, Report> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .expect("no lock poisoning")
            .push(query.to_owned());

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if let Some(gate) = &self.gate {
            gate.wait();
        }
        if let Some(message) = &self.failure {
            return Err(report!("{message}"));
        }

        Ok(self
            .results
            .iter()
            .map(|(title, path)| {
                SearchResult::new(self.kind, title.as_str()).path(path.as_str())
            })
            .collect())
    }

    fn execute(&self, result: &SearchResult) -> Result<(), ExecuteError> {
        if result.kind != self.kind {
            return Err(ExecuteError::UnsupportedKind {
                provider: self.name.clone(),
                expected: self.kind,
                found: result.kind,
            });
        }

        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        result.run_action().map_err(ExecuteError::Action)
    }
}
