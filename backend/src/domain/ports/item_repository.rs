//! Driven port for the primary item store.
//!
//! The primary store is the source of truth: it assigns identifiers and
//! creation timestamps, and list operations read from it rather than from the
//! search index.

use async_trait::async_trait;

use crate::domain::{Item, ItemId, NewItem, OwnerId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by primary store adapters.
    pub enum ItemRepositoryError {
        /// The store could not be reached or a connection could not be checked out.
        Connection { message: String } => "item store connection failed: {message}",
        /// A query failed or returned data that does not satisfy domain rules.
        Query { message: String } => "item store query failed: {message}",
    }
}

/// Persistence operations on items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist a new item, returning it with its assigned id and timestamp.
    async fn insert(&self, item: &NewItem) -> Result<Item, ItemRepositoryError>;

    /// Delete the item with `id`.
    ///
    /// Returns whether a record was removed; deleting an absent id is not an
    /// error.
    async fn delete_by_id(&self, id: &ItemId) -> Result<bool, ItemRepositoryError>;

    /// Every stored item, oldest first.
    async fn find_all(&self) -> Result<Vec<Item>, ItemRepositoryError>;

    /// Items belonging to `owner`, oldest first.
    async fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Item>, ItemRepositoryError>;
}
