//! Change fingerprint for stock snapshots
//!
//! A fingerprint is the canonical JSON of exactly the fields whose change
//! should reach subscribers: gear, seeds, eggs, the weather timestamp, honey
//! and cosmetics. Restock timestamps, the emoji lookup and fetch diagnostics
//! are left out, so a snapshot that only differs in those counts as unchanged.

use std::fmt;

use serde::Serialize;

use crate::error::{StockError, StockResult};
use crate::stock::{AggregateSnapshot, HoneyItem};

/// Borrowed view of the fingerprinted fields, serialized in declaration order
#[derive(Serialize)]
struct FingerprintFields<'a> {
    gear: &'a [String],
    seeds: &'a [String],
    egg: &'a [String],
    weather: Option<i64>,
    honey_stock: &'a [HoneyItem],
    cosmetics: &'a [String],
}

/// Comparable reduction of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a snapshot
    pub fn of(snapshot: &AggregateSnapshot) -> StockResult<Self> {
        let fields = FingerprintFields {
            gear: &snapshot.gear,
            seeds: &snapshot.seeds,
            egg: &snapshot.eggs,
            weather: snapshot.weather.updated_at,
            honey_stock: &snapshot.honey,
            cosmetics: &snapshot.cosmetics,
        };

        serde_json::to_string(&fields)
            .map(Fingerprint)
            .map_err(|e| StockError::internal(format!("Failed to fingerprint snapshot: {}", e)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::SeedEmoji;
    use chrono::Utc;

    fn sample() -> AggregateSnapshot {
        let mut snapshot = AggregateSnapshot::empty(Utc::now());
        snapshot.gear = vec!["Trowel **x1**".to_string(), "Watering Can **x3**".to_string()];
        snapshot.seeds = vec!["Carrot **x14**".to_string()];
        snapshot.eggs = vec!["Common Egg".to_string()];
        snapshot.cosmetics = vec!["Sign Crate".to_string()];
        snapshot.honey = vec![HoneyItem::new("Flower Seed Pack", 2.0)];
        snapshot.weather.updated_at = Some(1_717_000_000_000);
        snapshot.gear_seed_updated_at = Some(1_717_000_000_000);
        snapshot
    }

    #[test]
    fn test_equal_snapshots_equal_fingerprints() {
        assert_eq!(
            Fingerprint::of(&sample()).unwrap(),
            Fingerprint::of(&sample()).unwrap()
        );
    }

    #[test]
    fn test_ignores_volatile_fields() {
        let a = sample();
        let mut b = sample();
        b.gear_seed_updated_at = Some(1);
        b.egg_updated_at = Some(2);
        b.cosmetics_updated_at = Some(3);
        b.weather.current_weather = "Rain".to_string();
        b.emoji_seeds.push(SeedEmoji {
            name: "Carrot".to_string(),
            emoji: "🥕".to_string(),
        });
        b.fetched_at = Utc::now() + chrono::Duration::hours(1);

        assert_eq!(Fingerprint::of(&a).unwrap(), Fingerprint::of(&b).unwrap());
    }

    #[test]
    fn test_order_sensitive() {
        let a = sample();
        let mut b = sample();
        b.gear.reverse();

        assert_ne!(Fingerprint::of(&a).unwrap(), Fingerprint::of(&b).unwrap());
    }

    #[test]
    fn test_each_tracked_field_changes_fingerprint() {
        let base = Fingerprint::of(&sample()).unwrap();
        let mutations: Vec<fn(&mut AggregateSnapshot)> = vec![
            |s| s.gear.push("Lightning Rod".to_string()),
            |s| s.seeds.clear(),
            |s| s.eggs[0] = "Rare Egg".to_string(),
            |s| s.weather.updated_at = Some(1_717_000_000_001),
            |s| s.honey[0].value = 3.0,
            |s| s.cosmetics.push("Bench".to_string()),
        ];

        for mutate in mutations {
            let mut changed = sample();
            mutate(&mut changed);
            assert_ne!(base, Fingerprint::of(&changed).unwrap());
        }
    }

    #[test]
    fn test_category_boundaries_are_distinct() {
        // Same item moved between categories must not collide
        let mut a = AggregateSnapshot::empty(Utc::now());
        a.gear = vec!["Trowel".to_string()];
        let mut b = AggregateSnapshot::empty(Utc::now());
        b.seeds = vec!["Trowel".to_string()];

        assert_ne!(Fingerprint::of(&a).unwrap(), Fingerprint::of(&b).unwrap());
    }
}
