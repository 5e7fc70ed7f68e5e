//! Error types for the stock tracker

use thiserror::Error;

/// Tracker-wide error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StockError {
    pub fn internal(msg: impl Into<String>) -> Self {
        StockError::Internal(msg.into())
    }
}

/// Result type alias for tracker operations
pub type StockResult<T> = Result<T, StockError>;
