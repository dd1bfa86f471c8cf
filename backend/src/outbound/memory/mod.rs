//! In-process adapters used when no database or search endpoint is configured,
//! and by the HTTP integration tests.
//!
//! The in-memory index mirrors Elasticsearch semantics closely enough for the
//! sync worker: creating an existing index succeeds, writing to a missing index
//! is rejected, and deleting from a missing index removes nothing.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{
    ITEM_ID_FIELD, IndexName, ItemRepository, ItemRepositoryError, ItemSearchIndex,
    ItemSearchIndexError, SearchDocument,
};
use crate::domain::{Item, ItemId, NewItem, OwnerId};

/// Item store held in a mutex-guarded vector, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    items: Mutex<Vec<Item>>,
}

impl InMemoryItemRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Item>>, ItemRepositoryError> {
        self.items
            .lock()
            .map_err(|_: PoisonError<_>| ItemRepositoryError::query("item store lock poisoned"))
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn insert(&self, item: &NewItem) -> Result<Item, ItemRepositoryError> {
        let created = Item::from_new(item.clone(), ItemId::random(), Utc::now());
        self.lock()?.push(created.clone());
        Ok(created)
    }

    async fn delete_by_id(&self, id: &ItemId) -> Result<bool, ItemRepositoryError> {
        let mut items = self.lock()?;
        let before = items.len();
        items.retain(|item| item.id != *id);
        Ok(items.len() < before)
    }

    async fn find_all(&self) -> Result<Vec<Item>, ItemRepositoryError> {
        Ok(self.lock()?.clone())
    }

    async fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Item>, ItemRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|item| item.owner_id == *owner)
            .cloned()
            .collect())
    }
}

type Indices = BTreeMap<String, BTreeMap<ItemId, SearchDocument>>;

/// Search index held in memory, keyed by index name then document id.
#[derive(Debug, Default)]
pub struct InMemoryItemSearchIndex {
    indices: Mutex<Indices>,
}

impl InMemoryItemSearchIndex {
    /// Create an index store with no indices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indices created so far.
    pub fn index_count(&self) -> usize {
        self.lock().map_or(0, |indices| indices.len())
    }

    /// Documents currently stored in `index`, ordered by id.
    pub fn documents(&self, index: &IndexName) -> Vec<SearchDocument> {
        self.lock()
            .ok()
            .and_then(|indices| {
                indices
                    .get(index.as_str())
                    .map(|documents| documents.values().cloned().collect())
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Indices>, ItemSearchIndexError> {
        self.indices
            .lock()
            .map_err(|_: PoisonError<_>| ItemSearchIndexError::transport("index lock poisoned"))
    }
}

fn field_matches(document: &SearchDocument, field: &str, value: &str) -> bool {
    match field {
        ITEM_ID_FIELD => document.id.to_string() == value,
        "title" => document.title == value,
        "description" => document.description == value,
        _ => false,
    }
}

#[async_trait]
impl ItemSearchIndex for InMemoryItemSearchIndex {
    async fn ensure_index(&self, index: &IndexName) -> Result<(), ItemSearchIndexError> {
        self.lock()?.entry(index.as_str().to_owned()).or_default();
        Ok(())
    }

    async fn upsert(
        &self,
        index: &IndexName,
        document: &SearchDocument,
    ) -> Result<(), ItemSearchIndexError> {
        let mut indices = self.lock()?;
        let documents = indices.get_mut(index.as_str()).ok_or_else(|| {
            ItemSearchIndexError::rejected(format!("index_not_found_exception: {index}"))
        })?;
        documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn delete_by_field(
        &self,
        index: &IndexName,
        field: &str,
        value: &str,
    ) -> Result<u64, ItemSearchIndexError> {
        let mut indices = self.lock()?;
        let Some(documents) = indices.get_mut(index.as_str()) else {
            return Ok(0);
        };
        let before = documents.len();
        documents.retain(|_, document| !field_matches(document, field, value));
        Ok(u64::try_from(before - documents.len()).unwrap_or(u64::MAX))
    }
}
