//! Tracking command surface
//!
//! Chat integrations translate a user's `on`/`off` request into a call here
//! and deliver the returned [`CommandResponse`] however suits them.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::notifier::OutputChannel;
use crate::session::{SessionError, SessionRegistry, SubscriberId};

/// Requested tracking change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackAction {
    On,
    Off,
}

impl FromStr for TrackAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on" => Ok(TrackAction::On),
            "off" => Ok(TrackAction::Off),
            _ => Err(format!("Unknown tracking action: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandOutcome {
    Started,
    Stopped,
    AlreadyTracking,
    NotTracking,
    Usage,
}

/// Split a chat message into its action argument if it invokes `prefix`
///
/// Returns `None` when the message is not addressed to the command at all,
/// and `Some(None)` for a bare invocation without an argument.
pub fn parse_prefixed<'a>(content: &'a str, prefix: &str) -> Option<Option<&'a str>> {
    let rest = content.trim().strip_prefix(prefix)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.split_whitespace().next())
}

/// Seconds in `interval` as shown to users: `10`, `2.5`, `0.25`
fn interval_seconds(interval: Duration) -> String {
    let millis = interval.as_millis();
    if millis % 1000 == 0 {
        return (millis / 1000).to_string();
    }
    let text = format!("{}.{:03}", millis / 1000, millis % 1000);
    text.trim_end_matches('0').to_string()
}

/// Outcome plus the message to show the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResponse {
    pub outcome: CommandOutcome,
    pub message: String,
}

impl CommandResponse {
    fn new(outcome: CommandOutcome, message: String) -> Self {
        Self { outcome, message }
    }
}

/// Drives a session registry from chat commands
pub struct CommandHandler {
    registry: Arc<SessionRegistry>,
    prefix: String,
}

impl CommandHandler {
    pub fn new(registry: Arc<SessionRegistry>, prefix: impl Into<String>) -> Self {
        Self {
            registry,
            prefix: prefix.into(),
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn start(&self, subscriber: SubscriberId, channel: OutputChannel) -> CommandResponse {
        match self.registry.subscribe(subscriber, channel) {
            Ok(_) => CommandResponse::new(
                CommandOutcome::Started,
                format!(
                    "✅ Started tracking Grow A Garden stock. Updates every {} seconds!",
                    interval_seconds(self.registry.tick_interval())
                ),
            ),
            Err(_) => CommandResponse::new(
                CommandOutcome::AlreadyTracking,
                format!(
                    "📡 You're already tracking GAG stock! Use `{} off` to stop.",
                    self.prefix
                ),
            ),
        }
    }

    pub fn stop(&self, subscriber: SubscriberId) -> CommandResponse {
        match self.registry.unsubscribe(subscriber) {
            Ok(()) => CommandResponse::new(
                CommandOutcome::Stopped,
                "🛑 Stopped tracking Grow A Garden stock.".to_string(),
            ),
            Err(SessionError::NotSubscribed(_)) | Err(SessionError::AlreadySubscribed(_)) => {
                CommandResponse::new(
                    CommandOutcome::NotTracking,
                    "⚠️ You don't have an active GAG stock tracking session.".to_string(),
                )
            }
        }
    }

    pub fn usage(&self) -> CommandResponse {
        CommandResponse::new(
            CommandOutcome::Usage,
            format!(
                "📌 Usage:\n• `{0} on` to start tracking\n• `{0} off` to stop tracking",
                self.prefix
            ),
        )
    }

    /// Handle a raw action argument; anything other than `on`/`off` yields usage
    pub fn dispatch(
        &self,
        subscriber: SubscriberId,
        channel: OutputChannel,
        action: Option<&str>,
    ) -> CommandResponse {
        let parsed = action.and_then(|a| a.parse::<TrackAction>().ok());
        debug!("Command from {}: {:?}", subscriber, parsed);

        match parsed {
            Some(TrackAction::On) => self.start(subscriber, channel),
            Some(TrackAction::Off) => self.stop(subscriber),
            None => self.usage(),
        }
    }
}
