//! Search index adapters.

mod dto;
mod elasticsearch;

pub use elasticsearch::ElasticsearchItemIndex;
