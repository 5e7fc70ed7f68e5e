//! Discord gateway command bot

use std::sync::Arc;
use std::time::Duration;

use gagstock_providers::discord::DiscordClient;
use tracing::{debug, error, info, warn};
use twilight_gateway::{Event, EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::command::{parse_prefixed, CommandHandler};
use crate::notifier::OutputChannel;
use crate::session::SubscriberId;

/// Listens for tracking commands and replies in channel
pub struct DiscordBot {
    token: String,
    client: DiscordClient,
    commands: CommandHandler,
}

impl DiscordBot {
    pub fn new(token: String, client: DiscordClient, commands: CommandHandler) -> Self {
        Self {
            token,
            client,
            commands,
        }
    }

    /// Run the gateway connection forever, reconnecting after failures
    pub async fn start(self: Arc<Self>) {
        info!(
            "Starting Discord stock bot with prefix {}",
            self.commands.prefix()
        );

        loop {
            match self.run_gateway_loop().await {
                Ok(()) => {
                    warn!("Discord Gateway closed normally, reconnecting in 5s...");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                Err(e) => {
                    error!("Discord Gateway error: {}, reconnecting in 10s...", e);
                    tokio::time::sleep(Duration::from_secs(10)).await;
                }
            }
        }
    }

    async fn run_gateway_loop(&self) -> Result<(), DiscordBotError> {
        info!("Connecting to Discord Gateway...");

        let intents = Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT;
        let mut shard = Shard::new(ShardId::ONE, self.token.clone(), intents);
        // GatewayClose has no flag; the shard always yields it
        let wanted = EventTypeFlags::READY | EventTypeFlags::MESSAGE_CREATE;

        loop {
            let event = match shard.next_event(wanted).await {
                Some(Ok(event)) => event,
                Some(Err(source)) => {
                    return Err(DiscordBotError::GatewayError(source.to_string()));
                }
                None => return Ok(()),
            };

            match event {
                Event::Ready(ready) => {
                    info!("Discord Gateway connected as {}", ready.user.name);
                }
                Event::MessageCreate(msg) => {
                    self.handle_message_create(msg).await;
                }
                Event::GatewayClose(_) => {
                    warn!("Discord Gateway closed by server");
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    async fn handle_message_create(&self, msg: Box<MessageCreate>) {
        let message = &msg.0;
        if message.author.bot {
            return;
        }

        let Some(action) = parse_prefixed(&message.content, self.commands.prefix()) else {
            return;
        };

        let subscriber = SubscriberId(message.author.id.get());
        let channel = OutputChannel(message.channel_id.get());
        debug!("{} sent {:?} in {}", subscriber, action, channel);

        let response = self.commands.dispatch(subscriber, channel, action);

        if let Err(e) = self.client.send_message(channel.0, &response.message).await {
            warn!("Failed to reply to {} in {}: {}", subscriber, channel, e);
        }
    }
}

/// Errors that end one gateway connection
#[derive(Debug, thiserror::Error)]
pub enum DiscordBotError {
    #[error("Gateway error: {0}")]
    GatewayError(String),
}
