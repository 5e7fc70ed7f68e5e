//! Discord API client wrapper

use std::sync::Arc;

use twilight_http::Client as HttpClient;
use twilight_model::id::{marker::ChannelMarker, Id};

/// Maximum characters Discord accepts in message content
pub const MESSAGE_CONTENT_LIMIT: usize = 2000;

/// Discord client for posting to channels
#[derive(Clone)]
pub struct DiscordClient {
    http: Arc<HttpClient>,
}

impl DiscordClient {
    /// Create a new Discord client
    pub fn new(token: String) -> Self {
        Self {
            http: Arc::new(HttpClient::new(token)),
        }
    }

    /// Post a plain-text message to a channel
    pub async fn send_message(&self, channel_id: u64, content: &str) -> Result<(), DiscordClientError> {
        let channel = channel_marker(channel_id)?;

        self.http
            .create_message(channel)
            .content(content)
            .await
            .map_err(|e| DiscordClientError::HttpError(e.to_string()))?;

        Ok(())
    }

}

fn channel_marker(channel_id: u64) -> Result<Id<ChannelMarker>, DiscordClientError> {
    Id::new_checked(channel_id).ok_or(DiscordClientError::InvalidChannel(channel_id))
}

/// Errors that can occur when using the Discord client
#[derive(Debug, thiserror::Error)]
pub enum DiscordClientError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid channel id: {0}")]
    InvalidChannel(u64),
}
