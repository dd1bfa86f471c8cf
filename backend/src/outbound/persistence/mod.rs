//! PostgreSQL persistence for the primary item store.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay private
//! to this module; the rest of the crate only sees the `ItemRepository` port.
//!
//! ```ignore
//! use shop_items::outbound::persistence::{DbPool, DieselItemRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/shop")).await?;
//! let repository = DieselItemRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_item_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_item_repository::DieselItemRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
