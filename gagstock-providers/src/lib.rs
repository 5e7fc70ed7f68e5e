//! HTTP clients for the Grow A Garden stock feeds
//!
//! This crate provides clients for:
//! - The six stock providers merged into one snapshot on every tick
//! - The upstream "all stock" and weather statistics endpoints
//! - The locally persisted stock database document
//! - Discord message delivery (feature `discord`)

pub mod database;
pub mod discord;
pub mod endpoints;
pub mod error;
pub mod fetcher;
pub mod upstream;

pub use database::read_database;
pub use endpoints::ProviderEndpoints;
pub use error::ProviderError;
pub use fetcher::{FetchError, SnapshotSource, StockFetcher};
pub use upstream::{format_stocks, FormattedStocks, LastSeenEntry, StockEntry, UpstreamClient};
