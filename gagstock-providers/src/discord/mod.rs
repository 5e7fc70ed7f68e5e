//! Discord delivery for stock notifications
//!
//! This module wraps the Discord HTTP API so tracked stock reports can be
//! posted to the channel a subscriber started tracking from.

#[cfg(feature = "discord")]
pub mod client;

#[cfg(feature = "discord")]
pub use client::{DiscordClient, DiscordClientError, MESSAGE_CONTENT_LIMIT};
