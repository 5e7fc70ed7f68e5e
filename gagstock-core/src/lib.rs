//! Core types for the Grow A Garden stock tracker
//!
//! This crate defines the shared data structures used across the tracker:
//! the merged stock snapshot, the provider catalogue, the change fingerprint
//! and the restock countdown math.

pub mod countdown;
pub mod error;
pub mod fingerprint;
pub mod provider;
pub mod stock;

pub use countdown::{
    format_remaining, honey_countdown, restock_countdown, RestockCountdowns, ReferenceZone,
    COSMETICS_RESTOCK_SECS, EGG_RESTOCK_SECS, GEAR_SEED_RESTOCK_SECS,
};
pub use error::{StockError, StockResult};
pub use fingerprint::Fingerprint;
pub use provider::Provider;
pub use stock::{
    AggregateSnapshot, CosmeticsStock, EggStock, GearSeedStock, HoneyItem, HoneyStock, SeedEmoji,
    SeedEmojiStock, WeatherInfo,
};
