//! Lifecycle of the background index sync worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use shop_items::domain::ports::{IndexName, ItemSearchIndex};
use shop_items::domain::{IndexSyncSummary, IndexSyncWorker, IndexSyncWorkerConfig};
use shop_items::outbound::outbox::{ChannelIndexOutbox, index_outbox_channel};

/// Running worker plus the handle used to stop it.
pub struct IndexSyncTask {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<IndexSyncSummary>,
}

/// Create the outbox and spawn the worker that drains it.
pub fn spawn_index_sync(
    index: Arc<dyn ItemSearchIndex>,
    index_name: IndexName,
    config: IndexSyncWorkerConfig,
    capacity: usize,
) -> (ChannelIndexOutbox, IndexSyncTask) {
    let (outbox, receiver) = index_outbox_channel(capacity);
    let (shutdown, shutdown_rx) = oneshot::channel::<()>();
    let worker = IndexSyncWorker::new(index, index_name, config);
    let task = actix_web::rt::spawn(worker.run(receiver, async move {
        // A dropped sender also means shut down.
        let _ = shutdown_rx.await;
    }));
    (outbox, IndexSyncTask { shutdown, task })
}

impl IndexSyncTask {
    /// Signal shutdown and wait up to `drain` for buffered mutations.
    ///
    /// Mutations still pending when the wait expires are lost; the index
    /// is a derived copy and can be rebuilt from the primary store.
    pub async fn shutdown(self, drain: Duration) {
        let Self { shutdown, task } = self;
        if shutdown.send(()).is_err() {
            warn!("index sync worker already stopped");
        }
        match tokio::time::timeout(drain, task).await {
            Ok(Ok(summary)) => info!(
                applied = summary.applied,
                abandoned = summary.abandoned,
                "index outbox drained"
            ),
            Ok(Err(error)) => warn!(%error, "index sync worker failed"),
            Err(_) => warn!(?drain, "index outbox drain timed out; pending mutations dropped"),
        }
    }
}
