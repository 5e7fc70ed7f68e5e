//! Tracker configuration

use std::env;
use std::time::Duration;

use gagstock_core::ReferenceZone;
use thiserror::Error;

const DEFAULT_TICK_INTERVAL_MS: u64 = 10_000;
const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;
const DEFAULT_COMMAND_PREFIX: &str = "!gagstock";

/// Session and command settings
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Time between polls of one session
    pub tick_interval: Duration,
    /// Zone for the honey countdown and "last updated" stamps
    pub zone: ReferenceZone,
    /// Chat command prefix, e.g. `!gagstock`
    pub command_prefix: String,
    /// Discord bot token; the bot is disabled without one
    pub discord_token: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            zone: ReferenceZone::default(),
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            discord_token: None,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads:
    /// - GAGSTOCK_TICK_INTERVAL_MS: poll period (default 10000)
    /// - GAGSTOCK_UTC_OFFSET_HOURS: reference zone offset (default 8, Asia/Manila)
    /// - DISCORD_COMMAND_PREFIX: command prefix (default `!gagstock`)
    /// - DISCORD_BOT_TOKEN: optional bot token
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let tick_interval = match value("GAGSTOCK_TICK_INTERVAL_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => return Err(ConfigError::invalid("GAGSTOCK_TICK_INTERVAL_MS", raw)),
            },
            None => Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
        };

        let offset_hours = match value("GAGSTOCK_UTC_OFFSET_HOURS") {
            Some(raw) => raw
                .parse::<i32>()
                .map_err(|_| ConfigError::invalid("GAGSTOCK_UTC_OFFSET_HOURS", raw.clone()))?,
            None => DEFAULT_UTC_OFFSET_HOURS,
        };
        let zone = ReferenceZone::from_offset_hours(offset_hours).ok_or_else(|| {
            ConfigError::invalid("GAGSTOCK_UTC_OFFSET_HOURS", offset_hours.to_string())
        })?;

        Ok(Self {
            tick_interval,
            zone,
            command_prefix: value("DISCORD_COMMAND_PREFIX")
                .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string()),
            discord_token: value("DISCORD_BOT_TOKEN"),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

impl ConfigError {
    fn invalid(key: &str, value: String) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<TrackerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TrackerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.tick_interval, Duration::from_secs(10));
        assert_eq!(config.zone, ReferenceZone::manila());
        assert_eq!(config.command_prefix, "!gagstock");
        assert!(config.discord_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("GAGSTOCK_TICK_INTERVAL_MS", "2500"),
            ("GAGSTOCK_UTC_OFFSET_HOURS", "-5"),
            ("DISCORD_COMMAND_PREFIX", "!stock"),
            ("DISCORD_BOT_TOKEN", " token "),
        ])
        .unwrap();

        assert_eq!(config.tick_interval, Duration::from_millis(2500));
        assert_eq!(config.zone, ReferenceZone::from_offset_hours(-5).unwrap());
        assert_eq!(config.command_prefix, "!stock");
        assert_eq!(config.discord_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (key, raw) in [
            ("GAGSTOCK_TICK_INTERVAL_MS", "soon"),
            ("GAGSTOCK_TICK_INTERVAL_MS", "0"),
            ("GAGSTOCK_UTC_OFFSET_HOURS", "eight"),
            ("GAGSTOCK_UTC_OFFSET_HOURS", "30"),
        ] {
            match load(&[(key, raw)]) {
                Err(ConfigError::InvalidValue { key: k, .. }) => assert_eq!(k, key),
                other => panic!("expected invalid {} for '{}', got {:?}", key, raw, other),
            }
        }
    }

    #[test]
    fn test_blank_token_disables_bot() {
        let config = load(&[("DISCORD_BOT_TOKEN", "   ")]).unwrap();
        assert!(config.discord_token.is_none());
    }
}
