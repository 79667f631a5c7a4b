use std::{collections::HashSet, sync::Arc, time::Duration};

use arcstr::ArcStr;
use rootcause::{Report, report};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::search::{
    provider::{ExecuteError, Provider},
    result::{ResultKey, SearchResult},
    stream::{self, ProviderFailure, ResultBatch, SearchStreams, StreamSenders},
};

/// What a worker hands to the session's collector.
enum WorkerReport {
    Batch {
        priority: i32,
        provider: ArcStr,
        results: Vec<SearchResult>,
    },
    Failed(ProviderFailure),
}

/// Owns the providers and fans queries out to them.
///
/// Providers stay sorted by ascending priority; equal priorities keep their
/// registration order.
#[derive(Default)]
pub struct Registry {
    providers: Vec<Arc<dyn Provider>>,
    provider_timeout: Option<Duration>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds every `search` call. A provider that runs past the deadline is
    /// reported as failed; its blocking thread is left to finish on its own.
    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn register_provider(&mut self, provider: impl Provider + 'static) {
        self.register_shared(Arc::new(provider));
    }

    pub fn register_shared(&mut self, provider: Arc<dyn Provider>) {
        debug!(
            name = provider.name(),
            kind = %provider.kind(),
            priority = provider.priority(),
            "registering provider"
        );
        self.providers.push(provider);
        // `sort_by_key` is stable, ties keep registration order
        self.providers.sort_by_key(|p| p.priority());
    }

    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    /// Starts a search session for `query`.
    ///
    /// Must be called from within a Tokio runtime. Every applicable provider
    /// runs on its own task; a single collector deduplicates their results by
    /// [`ResultKey`] and publishes them on the returned streams. Cancelling
    /// `cancel` abandons the session: nothing further is published and the
    /// streams end with [`stream::SearchEvent::Cancelled`].
    #[must_use]
    pub fn search_async(&self, query: &str, cancel: CancellationToken) -> SearchStreams {
        let (senders, streams) = stream::channel();

        if query.trim().is_empty() {
            senders.finish();
            return streams;
        }

        let applicable: Vec<Arc<dyn Provider>> = self
            .providers
            .iter()
            .filter(|p| p.can_handle(query))
            .cloned()
            .collect();

        if applicable.is_empty() {
            debug!(query, "no provider can handle query");
            senders.finish();
            return streams;
        }

        debug!(
            query,
            providers = applicable.len(),
            "dispatching search"
        );

        let (worker_tx, worker_rx) = mpsc::channel(applicable.len());
        let query: Arc<str> = Arc::from(query);

        for provider in applicable {
            tokio::spawn(run_provider(
                provider,
                query.clone(),
                cancel.clone(),
                self.provider_timeout,
                worker_tx.clone(),
            ));
        }
        // The collector sees the channel close once the last worker is done.
        drop(worker_tx);

        tokio::spawn(collect(worker_rx, senders, cancel));

        streams
    }

    /// Routes `result` to the first provider of the same kind.
    ///
    /// # Errors
    ///
    /// [`ExecuteError::NoProvider`] when no provider of that kind is
    /// registered, otherwise whatever the provider's `execute` returns.
    pub fn execute_result(&self, result: &SearchResult) -> Result<(), ExecuteError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.kind() == result.kind)
            .ok_or(ExecuteError::NoProvider { kind: result.kind })?;

        debug!(
            provider = provider.name(),
            title = %result.title,
            "executing result"
        );

        provider.execute(result)
    }

    /// Lets every provider reload its own data. Blocking.
    pub fn refresh_providers(&self) {
        for provider in &self.providers {
            provider.refresh();
        }
    }
}

async fn run_provider(
    provider: Arc<dyn Provider>,
    query: Arc<str>,
    cancel: CancellationToken,
    timeout: Option<Duration>,
    tx: mpsc::Sender<WorkerReport>,
) {
    if cancel.is_cancelled() {
        return;
    }

    let name = ArcStr::from(provider.name());
    let kind = provider.kind();
    let priority = provider.priority();

    let search = {
        let provider = provider.clone();
        let query = query.clone();
        tokio::task::spawn_blocking(move || provider.search(&query))
    };

    let bounded = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, search)
                .await
                .unwrap_or_else(|_| Ok(Err(report!("timed out after {limit:?}")))),
            None => search.await,
        }
    };

    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        outcome = bounded => outcome,
    };

    if cancel.is_cancelled() {
        return;
    }

    let outcome: Result<Vec<SearchResult>, Report> =
        outcome.unwrap_or_else(|join_err| Err(report!("provider task failed: {join_err}")));

    let report = match outcome {
        Ok(results) if results.is_empty() => return,
        Ok(results) => WorkerReport::Batch {
            priority,
            provider: name,
            results,
        },
        Err(report) => {
            warn!(provider = %name, error = %report, "provider search failed");
            WorkerReport::Failed(ProviderFailure {
                provider: name,
                kind,
                report,
            })
        }
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => {}
        _ = tx.send(report) => {}
    }
}

/// Single writer of the session's dedup set.
async fn collect(
    mut rx: mpsc::Receiver<WorkerReport>,
    senders: StreamSenders,
    cancel: CancellationToken,
) {
    let mut seen: HashSet<ResultKey> = HashSet::new();

    loop {
        let report = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            report = rx.recv() => report,
        };

        let Some(report) = report else {
            break;
        };

        let delivered = match report {
            WorkerReport::Batch {
                priority,
                provider,
                results,
            } => {
                let total = results.len();
                let results: Vec<SearchResult> = results
                    .into_iter()
                    .filter(|result| seen.insert(result.key()))
                    .collect();

                if results.len() < total {
                    debug!(%provider, dropped = total - results.len(), "dropped duplicate results");
                }

                if results.is_empty() {
                    continue;
                }

                let batch = ResultBatch {
                    priority,
                    provider,
                    results,
                };

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return,
                    sent = senders.batches.send(batch) => sent.is_ok(),
                }
            }
            WorkerReport::Failed(failure) => tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                sent = senders.errors.send(failure) => sent.is_ok(),
            },
        };

        if !delivered {
            // Consumer went away without cancelling; nothing left to do.
            return;
        }
    }

    if cancel.is_cancelled() {
        return;
    }

    senders.finish();
}
