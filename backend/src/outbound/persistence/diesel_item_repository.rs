//! PostgreSQL-backed `ItemRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ItemRepository, ItemRepositoryError};
use crate::domain::{Item, ItemId, NewItem, OwnerId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ItemRow, NewItemRow};
use super::pool::{DbPool, PoolError};
use super::schema::items;

/// Diesel implementation of the primary item store.
#[derive(Clone)]
pub struct DieselItemRepository {
    pool: DbPool,
}

impl DieselItemRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ItemRepositoryError {
    map_basic_pool_error(error, ItemRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ItemRepositoryError {
    map_basic_diesel_error(
        error,
        ItemRepositoryError::query,
        ItemRepositoryError::connection,
    )
}

fn row_to_item(row: ItemRow) -> Result<Item, ItemRepositoryError> {
    let id = row.id;
    Item::try_from(row).map_err(|error| {
        warn!(item_id = %id, %error, "stored item violates domain rules");
        ItemRepositoryError::query(format!("stored item {id} is invalid: {error}"))
    })
}

fn rows_to_items(rows: Vec<ItemRow>) -> Result<Vec<Item>, ItemRepositoryError> {
    rows.into_iter().map(row_to_item).collect()
}

#[async_trait]
impl ItemRepository for DieselItemRepository {
    async fn insert(&self, item: &NewItem) -> Result<Item, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(items::table)
            .values(NewItemRow::from(item))
            .returning(ItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_item(row)
    }

    async fn delete_by_id(&self, id: &ItemId) -> Result<bool, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(items::table.filter(items::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn find_all(&self) -> Result<Vec<Item>, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = items::table
            .select(ItemRow::as_select())
            .order((items::created_at.asc(), items::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_items(rows)
    }

    async fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Item>, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = items::table
            .filter(items::owner_id.eq(owner.as_str()))
            .select(ItemRow::as_select())
            .order((items::created_at.asc(), items::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_items(rows)
    }
}
