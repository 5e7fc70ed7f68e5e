//! Provider definitions for the upstream stock feeds

use serde::{Deserialize, Serialize};
use std::fmt;

/// The independent HTTP data sources merged into one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provider {
    /// Gear and seed shop listing
    GearSeeds,
    /// Egg shop listing
    Eggs,
    /// Current weather and crop bonuses
    Weather,
    /// Honey event shop
    Honey,
    /// Cosmetics shop listing
    Cosmetics,
    /// Seed name to emoji lookup
    SeedEmoji,
}

impl Provider {
    /// Every provider, in fetch order
    pub const ALL: [Provider; 6] = [
        Provider::GearSeeds,
        Provider::Eggs,
        Provider::Weather,
        Provider::Honey,
        Provider::Cosmetics,
        Provider::SeedEmoji,
    ];

    /// Get the full display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::GearSeeds => "Gear/Seeds",
            Provider::Eggs => "Eggs",
            Provider::Weather => "Weather",
            Provider::Honey => "Honey",
            Provider::Cosmetics => "Cosmetics",
            Provider::SeedEmoji => "Seed Emoji",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
