//! Stock data structures for the upstream feeds and the merged snapshot
//!
//! Every upstream field is optional. Missing, `null` or wrongly typed fields
//! fall back to their default instead of failing the whole body, so one bad
//! field never empties an otherwise good category.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Provider;

/// Deserialize a field, substituting its default when the JSON does not fit
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Epoch-millisecond timestamp that may arrive as an integer, float or string
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_millis)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Truncate a float timestamp, rejecting values outside the `i64` range
fn float_millis(f: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (f.is_finite() && f >= -LIMIT && f < LIMIT).then(|| f as i64)
}

/// Numeric quantity that may arrive as a number or a numeric string
fn lenient_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or_default(),
        _ => 0.0,
    })
}

/// Gear and seed shop listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearSeedStock {
    #[serde(default, deserialize_with = "lenient")]
    pub gear: Vec<String>,
    /// Seed lines, optionally `"<name> **<quantity>**"`
    #[serde(default, deserialize_with = "lenient")]
    pub seeds: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<i64>,
}

/// Egg shop listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EggStock {
    #[serde(default, deserialize_with = "lenient")]
    pub egg: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<i64>,
}

/// Cosmetics shop listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmeticsStock {
    #[serde(default, deserialize_with = "lenient")]
    pub cosmetics: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<i64>,
}

/// Current weather report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub icon: String,
    #[serde(default, deserialize_with = "lenient")]
    pub current_weather: String,
    #[serde(default, deserialize_with = "lenient")]
    pub crop_bonuses: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<i64>,
}

/// A single honey shop entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoneyItem {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub value: f64,
}

impl HoneyItem {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Honey shop listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneyStock {
    #[serde(default, deserialize_with = "lenient")]
    pub honey_stock: Vec<HoneyItem>,
}

/// Seed name to emoji mapping entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedEmoji {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub emoji: String,
}

/// Seed emoji lookup response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedEmojiStock {
    #[serde(default, deserialize_with = "lenient")]
    pub seeds_stock: Vec<SeedEmoji>,
}

/// Merged view of every provider at one fetch instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSnapshot {
    pub gear: Vec<String>,
    pub seeds: Vec<String>,
    pub eggs: Vec<String>,
    pub cosmetics: Vec<String>,
    pub honey: Vec<HoneyItem>,
    pub weather: WeatherInfo,
    pub gear_seed_updated_at: Option<i64>,
    pub egg_updated_at: Option<i64>,
    pub cosmetics_updated_at: Option<i64>,
    /// Lookup only, never part of the fingerprint
    pub emoji_seeds: Vec<SeedEmoji>,
    pub fetched_at: DateTime<Utc>,
    /// Providers whose category fell back to its default for this fetch
    #[serde(default)]
    pub failed_providers: Vec<Provider>,
}

impl AggregateSnapshot {
    /// Snapshot with every category at its default
    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            gear: Vec::new(),
            seeds: Vec::new(),
            eggs: Vec::new(),
            cosmetics: Vec::new(),
            honey: Vec::new(),
            weather: WeatherInfo::default(),
            gear_seed_updated_at: None,
            egg_updated_at: None,
            cosmetics_updated_at: None,
            emoji_seeds: Vec::new(),
            fetched_at,
            failed_providers: Vec::new(),
        }
    }

    pub fn apply_gear_seed(&mut self, stock: GearSeedStock) {
        self.gear = stock.gear;
        self.seeds = stock.seeds;
        self.gear_seed_updated_at = stock.updated_at;
    }

    pub fn apply_egg(&mut self, stock: EggStock) {
        self.eggs = stock.egg;
        self.egg_updated_at = stock.updated_at;
    }

    pub fn apply_weather(&mut self, weather: WeatherInfo) {
        self.weather = weather;
    }

    pub fn apply_honey(&mut self, stock: HoneyStock) {
        self.honey = stock.honey_stock;
    }

    pub fn apply_cosmetics(&mut self, stock: CosmeticsStock) {
        self.cosmetics = stock.cosmetics;
        self.cosmetics_updated_at = stock.updated_at;
    }

    pub fn apply_seed_emoji(&mut self, stock: SeedEmojiStock) {
        self.emoji_seeds = stock.seeds_stock;
    }

    /// Record that a provider's category is defaulted in this snapshot
    pub fn mark_failed(&mut self, provider: Provider) {
        if !self.failed_providers.contains(&provider) {
            self.failed_providers.push(provider);
        }
    }

    /// Whether every category came back from its provider
    pub fn is_complete(&self) -> bool {
        self.failed_providers.is_empty()
    }

    /// Emoji for a seed line, matched case-insensitively on the text before ` **`
    pub fn seed_emoji(&self, seed_line: &str) -> Option<&str> {
        let name = seed_line.split(" **").next().unwrap_or(seed_line);
        self.emoji_seeds
            .iter()
            .find(|entry| entry.name.to_lowercase() == name.to_lowercase())
            .map(|entry| entry.emoji.as_str())
            .filter(|emoji| !emoji.is_empty())
    }
}
