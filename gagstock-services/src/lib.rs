//! Polling sessions and change detection for the Grow A Garden stock tracker
//!
//! This crate provides the service layer that owns per-subscriber polling
//! sessions, suppresses unchanged snapshots and hands changed ones to a
//! notifier, plus the command surface chat integrations drive it through.

pub mod clock;
pub mod command;
pub mod config;
pub mod discord;
pub mod formatter;
pub mod notifier;
pub mod scheduler;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{parse_prefixed, CommandHandler, CommandOutcome, CommandResponse, TrackAction};
pub use config::{ConfigError, TrackerConfig};
pub use formatter::{ReportField, StockReport};
pub use notifier::{Notifier, NotifyError, OutputChannel, StockNotification};
pub use scheduler::{ManualScheduler, ScheduleHandle, Scheduler, TickFn, TokioScheduler};
pub use session::{
    PollingSession, SessionError, SessionRegistry, SubscriberId, TickOutcome, TrackerContext,
};
