//! Driving port for item reads.

use async_trait::async_trait;

use crate::domain::{Error, Item, OwnerId};

/// Item reads exposed to inbound adapters. Reads go to the primary store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemsQuery: Send + Sync {
    /// Every item.
    async fn list_all(&self) -> Result<Vec<Item>, Error>;

    /// Items owned by `owner`; empty for unknown owners.
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Item>, Error>;
}

/// Fixture implementation returning no items.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureItemsQuery;

#[async_trait]
impl ItemsQuery for FixtureItemsQuery {
    async fn list_all(&self) -> Result<Vec<Item>, Error> {
        Ok(Vec::new())
    }

    async fn list_by_owner(&self, _owner: &OwnerId) -> Result<Vec<Item>, Error> {
        Ok(Vec::new())
    }
}
