//! Driving port for item mutations.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Error, Item, ItemId, NewItem};

/// Item mutations exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemsCommand: Send + Sync {
    /// Create an item and schedule its index upsert.
    async fn insert_item(&self, item: NewItem) -> Result<Item, Error>;

    /// Delete an item (absent ids succeed) and schedule its index removal.
    async fn delete_item(&self, id: &ItemId) -> Result<(), Error>;
}

/// Fixture implementation for handler tests that do not need persistence.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureItemsCommand;

#[async_trait]
impl ItemsCommand for FixtureItemsCommand {
    async fn insert_item(&self, item: NewItem) -> Result<Item, Error> {
        Ok(Item::from_new(item, ItemId::random(), Utc::now()))
    }

    async fn delete_item(&self, _id: &ItemId) -> Result<(), Error> {
        Ok(())
    }
}
