//! Server construction and middleware wiring.

mod config;
mod index_sync;
mod shutdown;
mod state_builders;

pub use config::ServerConfig;
pub use index_sync::spawn_index_sync;
pub use shutdown::{spawn_graceful_shutdown, wait_for_signal};
pub use state_builders::{build_http_state, build_item_repository, build_search_index};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use shop_items::Trace;
#[cfg(debug_assertions)]
use shop_items::doc::ApiDoc;
use shop_items::inbound::http::health::{HealthState, live, ready};
use shop_items::inbound::http::items::{configure, route_not_found};
use shop_items::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.configure(configure)
        .default_service(web::to(route_not_found))
}

/// Construct an Actix HTTP server serving the item endpoints.
///
/// Actix's own signal handling is disabled; pair the server with
/// [`spawn_graceful_shutdown`] so the probes report draining before the
/// listener stops.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: &ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .disable_signals()
    .bind(config.bind_addr())?
    .run();

    health_state.mark_ready();
    Ok(server)
}
