//! Discord front end for stock tracking
//!
//! The bot listens for `!gagstock on|off` in guild channels and drives the
//! command surface; the notifier posts changed stock reports back to the
//! channel tracking was started from.

#[cfg(feature = "discord")]
pub mod bot;
#[cfg(feature = "discord")]
pub mod notifier;

#[cfg(feature = "discord")]
pub use bot::{DiscordBot, DiscordBotError};
#[cfg(feature = "discord")]
pub use notifier::DiscordNotifier;
