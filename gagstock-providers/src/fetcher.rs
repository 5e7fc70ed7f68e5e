//! Snapshot fetcher
//!
//! Calls every stock provider concurrently and merges the answers into one
//! [`AggregateSnapshot`]. A provider that fails leaves its category at the
//! default and is retried on the next tick; only a fetch where every provider
//! failed is reported as an error.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use gagstock_core::{
    AggregateSnapshot, CosmeticsStock, EggStock, GearSeedStock, HoneyStock, Provider,
    SeedEmojiStock, WeatherInfo,
};

use crate::endpoints::ProviderEndpoints;
use crate::error::ProviderError;

/// Errors that abort a whole snapshot fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// No provider returned usable data
    #[error("All {0} stock providers failed")]
    AllProvidersFailed(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Anything that can produce a merged stock snapshot
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<AggregateSnapshot, FetchError>;
}

/// HTTP snapshot fetcher over the configured provider endpoints
pub struct StockFetcher {
    client: Client,
    endpoints: ProviderEndpoints,
}

impl StockFetcher {
    /// Create a fetcher whose requests are bounded by the endpoints' timeout
    pub fn new(endpoints: ProviderEndpoints) -> Self {
        Self {
            client: build_client(endpoints.timeout),
            endpoints,
        }
    }

    /// Fetch and decode one provider's body
    async fn get_json<T: DeserializeOwned>(&self, provider: Provider) -> Result<T, ProviderError> {
        let url = self.endpoints.url(provider);

        let response = self
            .client
            .get(url)
            .header("User-Agent", "GagStockTracker/1.0")
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status: response.status().as_u16(),
                message: format!("Failed to fetch {}", url),
            });
        }

        let body = response.bytes().await?;

        serde_json::from_slice(&body)
            .map_err(|e| ProviderError::ParseError(format!("{} response: {}", provider, e)))
    }
}

fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Apply a provider result to the snapshot, defaulting the category on failure
fn merge<T>(
    snapshot: &mut AggregateSnapshot,
    provider: Provider,
    result: Result<T, ProviderError>,
    apply: impl FnOnce(&mut AggregateSnapshot, T),
) {
    match result {
        Ok(value) => apply(snapshot, value),
        Err(e) => {
            warn!("Stock provider {} failed: {}", provider, e);
            snapshot.mark_failed(provider);
        }
    }
}

#[async_trait]
impl SnapshotSource for StockFetcher {
    async fn fetch(&self) -> Result<AggregateSnapshot, FetchError> {
        let (gear_seed, egg, weather, honey, cosmetics, seed_emoji) = tokio::join!(
            self.get_json::<GearSeedStock>(Provider::GearSeeds),
            self.get_json::<EggStock>(Provider::Eggs),
            self.get_json::<WeatherInfo>(Provider::Weather),
            self.get_json::<HoneyStock>(Provider::Honey),
            self.get_json::<CosmeticsStock>(Provider::Cosmetics),
            self.get_json::<SeedEmojiStock>(Provider::SeedEmoji),
        );

        let mut snapshot = AggregateSnapshot::empty(Utc::now());
        merge(&mut snapshot, Provider::GearSeeds, gear_seed, AggregateSnapshot::apply_gear_seed);
        merge(&mut snapshot, Provider::Eggs, egg, AggregateSnapshot::apply_egg);
        merge(&mut snapshot, Provider::Weather, weather, AggregateSnapshot::apply_weather);
        merge(&mut snapshot, Provider::Honey, honey, AggregateSnapshot::apply_honey);
        merge(&mut snapshot, Provider::Cosmetics, cosmetics, AggregateSnapshot::apply_cosmetics);
        merge(&mut snapshot, Provider::SeedEmoji, seed_emoji, AggregateSnapshot::apply_seed_emoji);

        if snapshot.failed_providers.len() == Provider::ALL.len() {
            return Err(FetchError::AllProvidersFailed(Provider::ALL.len()));
        }

        debug!(
            "Fetched stock snapshot: {} gear, {} seeds, {} eggs, {} cosmetics, {} honey ({} providers failed)",
            snapshot.gear.len(),
            snapshot.seeds.len(),
            snapshot.eggs.len(),
            snapshot.cosmetics.len(),
            snapshot.honey.len(),
            snapshot.failed_providers.len()
        );

        Ok(snapshot)
    }
}
