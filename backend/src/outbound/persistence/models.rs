//! Diesel row types for the `items` table. Internal to the adapter.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Cost, Item, ItemDescription, ItemId, ItemTitle, ItemValidationError, NewItem, OwnerId,
};

use super::schema::items;

/// Row read back from `items`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub cost_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = ItemValidationError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ItemId::from_uuid(row.id),
            owner_id: OwnerId::new(row.owner_id)?,
            title: ItemTitle::new(row.title)?,
            description: ItemDescription::new(row.description)?,
            cost: Cost::from_cents(row.cost_cents)?,
            created_at: row.created_at,
        })
    }
}

/// Insert payload; `id` and `created_at` come from column defaults.
#[derive(Debug, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub owner_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub cost_cents: i64,
}

impl<'a> From<&'a NewItem> for NewItemRow<'a> {
    fn from(item: &'a NewItem) -> Self {
        Self {
            owner_id: item.owner_id.as_str(),
            title: item.title.as_str(),
            description: item.description.as_str(),
            cost_cents: item.cost.cents(),
        }
    }
}
