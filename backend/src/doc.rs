//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every item endpoint, the health probes and the
//! envelope schemas. The document is served by Swagger UI in debug builds and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::envelope::{
    FailureEnvelope, ItemEnvelope, ItemResponse, ItemsEnvelope, MessageEnvelope,
    NotFoundEnvelope, ResponseStatus,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shop items API",
        description = "Items kept in a primary store and mirrored into a search index."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::items::insert_item,
        crate::inbound::http::items::delete_item,
        crate::inbound::http::items::list_items,
        crate::inbound::http::items::list_items_by_owner,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ResponseStatus,
        ItemResponse,
        ItemEnvelope,
        ItemsEnvelope,
        MessageEnvelope,
        FailureEnvelope,
        NotFoundEnvelope
    )),
    tags(
        (name = "items", description = "Item catalogue operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
