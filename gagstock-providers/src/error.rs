//! Error types for the provider clients

use thiserror::Error;

/// Errors that can occur when talking to a stock provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Request exceeded its timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Provider returned a non-success status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Failed to parse the response body
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Local document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local document could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::RequestFailed(e.to_string())
        }
    }
}
