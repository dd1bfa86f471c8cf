//! Server entry-point: loads settings, connects the stores, starts the index
//! sync worker and serves the item endpoints.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use shop_items::inbound::http::health::HealthState;
use shop_items::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use shop_items::settings::AppSettings;

use server::{
    ServerConfig, build_http_state, build_item_repository, build_search_index, create_server,
    spawn_graceful_shutdown, spawn_index_sync, wait_for_signal,
};

/// Connect the primary store, applying pending migrations first.
async fn connect_database(
    settings: &AppSettings,
    config: ServerConfig,
) -> io::Result<ServerConfig> {
    let Some(database_url) = settings.database_url() else {
        return Ok(config);
    };
    run_pending_migrations(database_url)
        .await
        .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
    let pool_config = PoolConfig::new(database_url).with_max_size(settings.db_max_connections());
    let pool = DbPool::new(pool_config)
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    info!(
        max_connections = settings.db_max_connections(),
        "connected to primary store"
    );
    Ok(config.with_db_pool(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let index_name = settings.items_index().map_err(io::Error::other)?;

    let config = connect_database(&settings, ServerConfig::new(bind_addr)).await?;
    let search_index = build_search_index(&settings)?;
    let (outbox, index_sync) = spawn_index_sync(
        search_index,
        index_name,
        settings.index_sync_worker(),
        settings.index_outbox_capacity(),
    );

    let http_state = build_http_state(build_item_repository(&config), Arc::new(outbox));
    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting shop items server");
    let server = create_server(health_state.clone(), http_state, &config)?;
    spawn_graceful_shutdown(
        wait_for_signal(),
        server.handle(),
        health_state,
        settings.shutdown_grace(),
    );
    let result = server.await;

    index_sync.shutdown(settings.shutdown_drain()).await;
    result
}
