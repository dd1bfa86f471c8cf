//! Index sync worker: drains the index outbox into the search index.
//!
//! One worker applies mutations strictly in enqueue order, so an item's upsert
//! always lands before a later delete of the same item. Retryable failures are
//! retried with jittered exponential backoff; the index is (re-)ensured before
//! the first write and after every failed attempt, which makes index creation
//! part of the retry loop rather than a startup precondition.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::domain::TraceId;
use crate::domain::ports::{
    ITEM_ID_FIELD, IndexMutation, IndexMutationReceiver, IndexName, ItemSearchIndex,
    ItemSearchIndexError, PendingIndexMutation,
};

mod runtime;

pub use runtime::{IndexSyncWorkerRuntime, RandomJitter, TokioSleeper};

/// Retry configuration for applying one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSyncWorkerConfig {
    /// Maximum attempts per mutation, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on the un-jittered delay.
    pub max_backoff: Duration,
}

impl Default for IndexSyncWorkerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Async sleeping abstraction so tests can observe retry delays.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Jitter applied on top of the exponential base delay.
pub trait BackoffJitter: Send + Sync {
    /// Return the delay to wait before retry `attempt`.
    fn jittered_delay(&self, base: Duration, attempt: u32) -> Duration;
}

/// A mutation that was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSyncOutcome {
    /// Attempts used, including the successful one.
    pub attempts: u32,
}

/// A mutation that was given up on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("index mutation abandoned after {attempts} attempt(s): {error}")]
pub struct IndexSyncFailure {
    /// Attempts made before giving up.
    pub attempts: u32,
    /// Last error observed.
    pub error: ItemSearchIndexError,
}

/// Totals reported when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSyncSummary {
    /// Mutations applied.
    pub applied: u64,
    /// Mutations abandoned.
    pub abandoned: u64,
}

/// Domain-owned worker mirroring primary-store mutations into the index.
pub struct IndexSyncWorker {
    index: Arc<dyn ItemSearchIndex>,
    index_name: IndexName,
    sleeper: Arc<dyn RetrySleeper>,
    jitter: Arc<dyn BackoffJitter>,
    config: IndexSyncWorkerConfig,
    index_ready: AtomicBool,
}

impl IndexSyncWorker {
    /// Build a worker with the default Tokio runtime helpers.
    pub fn new(
        index: Arc<dyn ItemSearchIndex>,
        index_name: IndexName,
        config: IndexSyncWorkerConfig,
    ) -> Self {
        Self::with_runtime(index, index_name, config, IndexSyncWorkerRuntime::default())
    }

    /// Build a worker with explicit sleeper and jitter strategies.
    pub fn with_runtime(
        index: Arc<dyn ItemSearchIndex>,
        index_name: IndexName,
        config: IndexSyncWorkerConfig,
        runtime: IndexSyncWorkerRuntime,
    ) -> Self {
        Self {
            index,
            index_name,
            sleeper: runtime.sleeper,
            jitter: runtime.jitter,
            config: IndexSyncWorkerConfig {
                max_attempts: config.max_attempts.max(1),
                ..config
            },
            index_ready: AtomicBool::new(false),
        }
    }

    /// Apply one mutation, retrying retryable failures.
    ///
    /// # Errors
    ///
    /// Returns [`IndexSyncFailure`] when the error is not retryable or the
    /// attempt budget is exhausted.
    pub async fn apply(
        &self,
        mutation: &IndexMutation,
    ) -> Result<IndexSyncOutcome, IndexSyncFailure> {
        let mut attempt = 1;
        loop {
            match self.try_apply(mutation).await {
                Ok(()) => return Ok(IndexSyncOutcome { attempts: attempt }),
                Err(error) if error.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self
                        .jitter
                        .jittered_delay(self.retry_base_delay(attempt), attempt);
                    warn!(%error, attempt, ?delay, "index mutation failed; retrying");
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    return Err(IndexSyncFailure {
                        attempts: attempt,
                        error,
                    });
                }
            }
        }
    }

    /// Drain `receiver` until it is exhausted or `shutdown` resolves.
    ///
    /// On shutdown the queue is closed to new mutations and whatever is
    /// already buffered is still applied before returning.
    pub async fn run<S>(
        self,
        mut receiver: IndexMutationReceiver,
        shutdown: S,
    ) -> IndexSyncSummary
    where
        S: Future<Output = ()>,
    {
        info!(index = %self.index_name, "index sync worker started");
        let mut summary = IndexSyncSummary::default();
        let mut shutdown = std::pin::pin!(shutdown);
        let mut closing = false;

        loop {
            let next = if closing {
                receiver.recv().await
            } else {
                tokio::select! {
                    next = receiver.recv() => next,
                    () = &mut shutdown => {
                        debug!("index outbox closing; draining buffered mutations");
                        receiver.close();
                        closing = true;
                        continue;
                    }
                }
            };
            let Some(pending) = next else { break };
            self.process(pending, &mut summary).await;
        }

        info!(
            applied = summary.applied,
            abandoned = summary.abandoned,
            "index sync worker stopped"
        );
        summary
    }

    async fn process(&self, pending: PendingIndexMutation, summary: &mut IndexSyncSummary) {
        let PendingIndexMutation { mutation, trace_id } = pending;
        let trace_label = trace_id.map_or_else(String::new, |id| id.to_string());
        let span = info_span!(
            "index_mutation",
            item_id = %mutation.item_id(),
            kind = mutation.kind(),
            trace_id = %trace_label,
        );
        let work = async {
            match self.apply(&mutation).await {
                Ok(outcome) => {
                    debug!(attempts = outcome.attempts, "index mutation applied");
                    summary.applied += 1;
                }
                Err(failure) => {
                    error!(
                        error = %failure.error,
                        attempts = failure.attempts,
                        "index mutation abandoned; search index diverges from primary store"
                    );
                    summary.abandoned += 1;
                }
            }
        }
        .instrument(span);

        match trace_id {
            Some(id) => TraceId::scope(id, work).await,
            None => work.await,
        }
    }

    async fn try_apply(&self, mutation: &IndexMutation) -> Result<(), ItemSearchIndexError> {
        let result = self.write(mutation).await;
        if result.is_err() {
            self.index_ready.store(false, Ordering::Release);
        }
        result
    }

    async fn write(&self, mutation: &IndexMutation) -> Result<(), ItemSearchIndexError> {
        if !self.index_ready.load(Ordering::Acquire) {
            self.index.ensure_index(&self.index_name).await?;
            self.index_ready.store(true, Ordering::Release);
        }
        match mutation {
            IndexMutation::Upsert(document) => self.index.upsert(&self.index_name, document).await,
            IndexMutation::Delete { item_id } => {
                let deleted = self
                    .index
                    .delete_by_field(&self.index_name, ITEM_ID_FIELD, &item_id.to_string())
                    .await?;
                debug!(deleted, "index documents removed");
                Ok(())
            }
        }
    }

    fn retry_base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.config.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.config.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}
