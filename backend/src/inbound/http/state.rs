//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on the
//! driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ItemsCommand, ItemsQuery};

/// Dependency bundle for the item handlers.
#[derive(Clone)]
pub struct HttpState {
    pub items: Arc<dyn ItemsCommand>,
    pub items_query: Arc<dyn ItemsQuery>,
}

impl HttpState {
    /// Bundle the command and query ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use shop_items::domain::ports::{FixtureItemsCommand, FixtureItemsQuery};
    /// use shop_items::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureItemsCommand), Arc::new(FixtureItemsQuery));
    /// let _items = state.items.clone();
    /// ```
    pub fn new(items: Arc<dyn ItemsCommand>, items_query: Arc<dyn ItemsQuery>) -> Self {
        Self { items, items_query }
    }
}
