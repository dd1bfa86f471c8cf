//! Bounded in-process index outbox backed by a Tokio channel.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::TraceId;
use crate::domain::ports::{
    IndexMutation, IndexMutationReceiver, IndexOutbox, IndexOutboxError, PendingIndexMutation,
};

/// Sending half of the index outbox.
///
/// Enqueueing never waits: a full queue is reported as
/// [`IndexOutboxError::Full`] so request latency is independent of the index.
#[derive(Debug, Clone)]
pub struct ChannelIndexOutbox {
    sender: mpsc::Sender<PendingIndexMutation>,
    capacity: usize,
}

/// Create an outbox and the receiver the sync worker drains.
pub fn index_outbox_channel(capacity: usize) -> (ChannelIndexOutbox, IndexMutationReceiver) {
    let capacity = capacity.max(1);
    let (sender, receiver) = mpsc::channel(capacity);
    (ChannelIndexOutbox { sender, capacity }, receiver)
}

#[async_trait]
impl IndexOutbox for ChannelIndexOutbox {
    async fn enqueue(&self, mutation: IndexMutation) -> Result<(), IndexOutboxError> {
        let pending = PendingIndexMutation {
            mutation,
            trace_id: TraceId::current(),
        };
        self.sender.try_send(pending).map_err(|error| match error {
            TrySendError::Full(_) => IndexOutboxError::full(self.capacity),
            TrySendError::Closed(_) => IndexOutboxError::closed(),
        })
    }
}
