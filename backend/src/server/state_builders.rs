//! Builders wiring adapters into the coordinator and the HTTP state.

use std::io;
use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use shop_items::domain::ItemCatalogService;
use shop_items::domain::ports::{IndexOutbox, ItemRepository, ItemSearchIndex};
use shop_items::inbound::http::state::HttpState;
use shop_items::outbound::memory::{InMemoryItemRepository, InMemoryItemSearchIndex};
use shop_items::outbound::persistence::DieselItemRepository;
use shop_items::outbound::search::ElasticsearchItemIndex;
use shop_items::settings::AppSettings;

use super::ServerConfig;

/// Primary store: PostgreSQL when a pool is configured, memory otherwise.
pub fn build_item_repository(config: &ServerConfig) -> Arc<dyn ItemRepository> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselItemRepository::new(pool.clone())),
        None => {
            warn!("no database configured; items are kept in memory");
            Arc::new(InMemoryItemRepository::new())
        }
    }
}

/// Search index: Elasticsearch when a URL is configured, memory otherwise.
///
/// # Errors
/// Returns [`io::Error`] when the URL is invalid or the HTTP client cannot be
/// built.
pub fn build_search_index(settings: &AppSettings) -> io::Result<Arc<dyn ItemSearchIndex>> {
    let endpoint = settings.elastic_url().map_err(io::Error::other)?;
    match endpoint {
        Some(endpoint) => {
            info!(%endpoint, "mirroring items into Elasticsearch");
            let index = ElasticsearchItemIndex::new(endpoint, settings.elastic_timeout())
                .map_err(|error| io::Error::other(format!("build search client: {error}")))?
                .with_document_type(settings.items_document_type());
            Ok(Arc::new(index))
        }
        None => {
            warn!("no search endpoint configured; the item index is kept in memory");
            Ok(Arc::new(InMemoryItemSearchIndex::new()))
        }
    }
}

/// Bundle the coordinator behind both driving ports.
pub fn build_http_state(
    repository: Arc<dyn ItemRepository>,
    outbox: Arc<dyn IndexOutbox>,
) -> web::Data<HttpState> {
    let catalog = Arc::new(ItemCatalogService::new(repository, outbox));
    web::Data::new(HttpState::new(catalog.clone(), catalog))
}
