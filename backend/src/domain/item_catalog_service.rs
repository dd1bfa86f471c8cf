//! Item catalogue service: the dual-write coordinator.
//!
//! Every mutation is written to the primary store first. Only once that write
//! succeeds is the matching index mutation queued on the outbox; the search
//! index is a derived view and its failures never reach the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{
    IndexMutation, IndexOutbox, ItemRepository, ItemRepositoryError, ItemsCommand, ItemsQuery,
    SearchDocument,
};
use crate::domain::{Error, Item, ItemId, NewItem, OwnerId};

/// Coordinator implementing the item driving ports.
pub struct ItemCatalogService<R: ?Sized, O: ?Sized> {
    repository: Arc<R>,
    outbox: Arc<O>,
}

impl<R: ?Sized, O: ?Sized> Clone for ItemCatalogService<R, O> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            outbox: Arc::clone(&self.outbox),
        }
    }
}

impl<R: ?Sized, O: ?Sized> ItemCatalogService<R, O> {
    /// Create a service over the primary store and the index outbox.
    pub fn new(repository: Arc<R>, outbox: Arc<O>) -> Self {
        Self { repository, outbox }
    }
}

impl<R, O> ItemCatalogService<R, O>
where
    R: ItemRepository + ?Sized,
    O: IndexOutbox + ?Sized,
{
    fn map_repository_error(error: ItemRepositoryError) -> Error {
        match error {
            ItemRepositoryError::Connection { message } => {
                warn!(%message, "item store unavailable");
                Error::service_unavailable("item store unavailable")
            }
            ItemRepositoryError::Query { message } => {
                Error::internal(format!("item store error: {message}"))
            }
        }
    }

    async fn mirror(&self, mutation: IndexMutation) {
        let item_id = mutation.item_id();
        let kind = mutation.kind();
        if let Err(error) = self.outbox.enqueue(mutation).await {
            warn!(
                %error,
                %item_id,
                kind,
                "index mutation dropped; search index will drift until the item is rewritten"
            );
        }
    }
}

#[async_trait]
impl<R, O> ItemsCommand for ItemCatalogService<R, O>
where
    R: ItemRepository + ?Sized,
    O: IndexOutbox + ?Sized,
{
    async fn insert_item(&self, item: NewItem) -> Result<Item, Error> {
        let created = self
            .repository
            .insert(&item)
            .await
            .map_err(Self::map_repository_error)?;
        debug!(item_id = %created.id, owner_id = %created.owner_id, "item stored");
        self.mirror(IndexMutation::Upsert(SearchDocument::from(&created)))
            .await;
        Ok(created)
    }

    async fn delete_item(&self, id: &ItemId) -> Result<(), Error> {
        let removed = self
            .repository
            .delete_by_id(id)
            .await
            .map_err(Self::map_repository_error)?;
        debug!(item_id = %id, removed, "item delete applied");
        // Queue the index delete even when nothing was removed so stale
        // documents are cleaned up.
        self.mirror(IndexMutation::Delete { item_id: *id }).await;
        Ok(())
    }
}

#[async_trait]
impl<R, O> ItemsQuery for ItemCatalogService<R, O>
where
    R: ItemRepository + ?Sized,
    O: IndexOutbox + ?Sized,
{
    async fn list_all(&self) -> Result<Vec<Item>, Error> {
        self.repository
            .find_all()
            .await
            .map_err(Self::map_repository_error)
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Item>, Error> {
        self.repository
            .find_by_owner(owner)
            .await
            .map_err(Self::map_repository_error)
    }
}

#[cfg(test)]
#[path = "item_catalog_service_tests.rs"]
mod tests;
