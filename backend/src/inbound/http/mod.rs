//! HTTP inbound adapter exposing the item endpoints.

pub mod envelope;
pub mod error;
pub mod health;
pub mod items;
pub mod state;
pub mod validation;

pub use error::ApiResult;
