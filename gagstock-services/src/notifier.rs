//! Notification delivery seam

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gagstock_core::{AggregateSnapshot, RestockCountdowns};

use crate::session::SubscriberId;

/// Where a subscriber's stock reports are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputChannel(pub u64);

impl fmt::Display for OutputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel-{}", self.0)
    }
}

/// A changed snapshot ready to be delivered
#[derive(Debug, Clone)]
pub struct StockNotification {
    pub subscriber: SubscriberId,
    pub destination: OutputChannel,
    pub snapshot: AggregateSnapshot,
    pub countdowns: RestockCountdowns,
    /// Local clock time of the tick, e.g. `04:15:30 PM`
    pub last_updated: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
}

/// Delivers stock notifications to their destination
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: StockNotification) -> Result<(), NotifyError>;
}
