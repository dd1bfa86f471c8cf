//! Driven port for the derived search index.
//!
//! The index holds one document per item, keyed by item id, and is only ever
//! written by the index sync worker. Every operation is safe to repeat.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{Item, ItemId};

use super::define_port_error;

/// Document field holding the item identifier; deletes match on it.
pub const ITEM_ID_FIELD: &str = "id";

const INDEX_NAME_MAX_BYTES: usize = 255;
const INDEX_NAME_FORBIDDEN: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ':'];

/// Validation failures for [`IndexName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexNameValidationError {
    /// The name is empty.
    #[error("index name must not be empty")]
    Empty,
    /// The name exceeds the byte limit.
    #[error("index name must be at most {max} bytes")]
    TooLong { max: usize },
    /// The name contains upper-case letters.
    #[error("index name must be lowercase")]
    NotLowercase,
    /// The name contains a reserved character or whitespace.
    #[error("index name must not contain {character:?}")]
    ForbiddenCharacter { character: char },
    /// The name starts with `-`, `_` or `+`, or is `.`/`..`.
    #[error("index name must not start with '-', '_' or '+' or be '.' or '..'")]
    ReservedForm,
}

/// Name of the search index holding item documents.
///
/// ```
/// use shop_items::domain::ports::IndexName;
///
/// assert!(IndexName::new("items").is_ok());
/// assert!(IndexName::new("Items").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexName(String);

impl IndexName {
    /// Validate and wrap an index name.
    pub fn new(raw: impl Into<String>) -> Result<Self, IndexNameValidationError> {
        let name = raw.into();
        if name.is_empty() {
            return Err(IndexNameValidationError::Empty);
        }
        if name.len() > INDEX_NAME_MAX_BYTES {
            return Err(IndexNameValidationError::TooLong {
                max: INDEX_NAME_MAX_BYTES,
            });
        }
        if name.chars().any(char::is_uppercase) {
            return Err(IndexNameValidationError::NotLowercase);
        }
        if let Some(character) = name
            .chars()
            .find(|c| c.is_whitespace() || INDEX_NAME_FORBIDDEN.contains(c))
        {
            return Err(IndexNameValidationError::ForbiddenCharacter { character });
        }
        if name == "." || name == ".." || name.starts_with(['-', '_', '+']) {
            return Err(IndexNameValidationError::ReservedForm);
        }
        Ok(Self(name))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Indexed projection of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDocument {
    /// Item identifier, also used as the document id.
    pub id: ItemId,
    /// Item title.
    pub title: String,
    /// Item description.
    pub description: String,
}

impl From<&Item> for SearchDocument {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            title: item.title.as_str().to_owned(),
            description: item.description.as_str().to_owned(),
        }
    }
}

define_port_error! {
    /// Errors raised by search index adapters.
    pub enum ItemSearchIndexError {
        /// Connection-level failure or a server-side error.
        Transport { message: String } => "search index transport failed: {message}",
        /// The request timed out.
        Timeout { message: String } => "search index request timed out: {message}",
        /// The index is overloaded or temporarily unavailable.
        Unavailable { message: String } => "search index unavailable: {message}",
        /// The index refused the request as malformed.
        Rejected { message: String } => "search index rejected request: {message}",
        /// The response could not be decoded.
        Decode { message: String } => "search index response decode failed: {message}",
    }
}

impl ItemSearchIndexError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::Unavailable { .. }
        )
    }
}

/// Search index operations used to mirror the primary store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemSearchIndex: Send + Sync {
    /// Create `index` unless it already exists.
    async fn ensure_index(&self, index: &IndexName) -> Result<(), ItemSearchIndexError>;

    /// Create or replace the document for `document.id`.
    async fn upsert(
        &self,
        index: &IndexName,
        document: &SearchDocument,
    ) -> Result<(), ItemSearchIndexError>;

    /// Delete every document whose `field` matches `value`, returning how many
    /// were removed. Zero matches is success.
    async fn delete_by_field(
        &self,
        index: &IndexName,
        field: &str,
        value: &str,
    ) -> Result<u64, ItemSearchIndexError>;
}
