//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL primary store via Diesel
//! - **search**: Elasticsearch index over HTTP via reqwest
//! - **outbox**: bounded Tokio channel feeding the index sync worker
//! - **memory**: in-process store and index for development and tests
//!
//! Adapters translate between domain types and infrastructure representations.
//! They contain no business logic.

pub mod memory;
pub mod outbox;
pub mod persistence;
pub mod search;
