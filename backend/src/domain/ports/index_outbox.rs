//! Driven port for queuing search index mutations.
//!
//! The coordinator records what the index must do after each primary-store
//! write; the index sync worker drains the queue in order and applies each
//! mutation with retries.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{ItemId, TraceId};

use super::{SearchDocument, define_port_error};

/// Index change derived from a primary-store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexMutation {
    /// Create or replace the document for an inserted item.
    Upsert(SearchDocument),
    /// Remove any document for a deleted item.
    Delete {
        /// Identifier of the deleted item.
        item_id: ItemId,
    },
}

impl IndexMutation {
    /// Item the mutation concerns.
    pub fn item_id(&self) -> ItemId {
        match self {
            Self::Upsert(document) => document.id,
            Self::Delete { item_id } => *item_id,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upsert(_) => "upsert",
            Self::Delete { .. } => "delete",
        }
    }
}

/// A queued mutation plus the trace identifier of the request that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingIndexMutation {
    /// The mutation to apply.
    pub mutation: IndexMutation,
    /// Trace identifier in scope when the mutation was enqueued.
    pub trace_id: Option<TraceId>,
}

/// Receiving half drained by the index sync worker.
pub type IndexMutationReceiver = mpsc::Receiver<PendingIndexMutation>;

define_port_error! {
    /// Errors raised when a mutation cannot be queued.
    pub enum IndexOutboxError {
        /// The queue is at capacity.
        Full { capacity: usize } => "index outbox is full (capacity {capacity})",
        /// The worker has stopped and the queue no longer accepts mutations.
        Closed => "index outbox is closed",
    }
}

/// Non-blocking sink for index mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndexOutbox: Send + Sync {
    /// Queue `mutation` for the sync worker.
    async fn enqueue(&self, mutation: IndexMutation) -> Result<(), IndexOutboxError>;
}
