//! Domain primitives, services, and ports.
//!
//! Public surface:
//! - [`Item`] and its validated fields, with [`Cost`] held in minor units.
//! - [`ItemCatalogService`]: the dual-write coordinator behind the driving ports.
//! - [`IndexSyncWorker`]: applies queued index mutations with retries.
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failures.

pub mod error;
pub mod index_sync_worker;
pub mod item;
pub mod item_catalog_service;
pub mod ports;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::index_sync_worker::{
    BackoffJitter, IndexSyncFailure, IndexSyncOutcome, IndexSyncSummary, IndexSyncWorker,
    IndexSyncWorkerConfig, IndexSyncWorkerRuntime, RandomJitter, RetrySleeper, TokioSleeper,
};
pub use self::item::{
    Cost, Item, ItemDescription, ItemId, ItemTitle, ItemValidationError, NewItem, OwnerId,
};
pub use self::item_catalog_service::ItemCatalogService;
pub use self::trace_id::TraceId;
