//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod index_outbox;
mod item_repository;
mod item_search_index;
mod items_command;
mod items_query;

#[cfg(test)]
pub use index_outbox::MockIndexOutbox;
pub use index_outbox::{
    IndexMutation, IndexMutationReceiver, IndexOutbox, IndexOutboxError, PendingIndexMutation,
};
#[cfg(test)]
pub use item_repository::MockItemRepository;
pub use item_repository::{ItemRepository, ItemRepositoryError};
#[cfg(test)]
pub use item_search_index::MockItemSearchIndex;
pub use item_search_index::{
    ITEM_ID_FIELD, IndexName, IndexNameValidationError, ItemSearchIndex, ItemSearchIndexError,
    SearchDocument,
};
#[cfg(test)]
pub use items_command::MockItemsCommand;
pub use items_command::{FixtureItemsCommand, ItemsCommand};
#[cfg(test)]
pub use items_query::MockItemsQuery;
pub use items_query::{FixtureItemsQuery, ItemsQuery};
