//! Posts stock reports to Discord channels

use async_trait::async_trait;
use gagstock_providers::discord::{DiscordClient, DiscordClientError, MESSAGE_CONTENT_LIMIT};

use crate::formatter::StockReport;
use crate::notifier::{Notifier, NotifyError, StockNotification};

pub struct DiscordNotifier {
    client: DiscordClient,
}

impl DiscordNotifier {
    pub fn new(client: DiscordClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, notification: StockNotification) -> Result<(), NotifyError> {
        let report = StockReport::from_notification(&notification);
        let content = report.render_text(MESSAGE_CONTENT_LIMIT);

        self.client
            .send_message(notification.destination.0, &content)
            .await
            .map_err(|e| match e {
                DiscordClientError::InvalidChannel(id) => {
                    NotifyError::InvalidDestination(id.to_string())
                }
                other => NotifyError::Delivery(other.to_string()),
            })
    }
}
