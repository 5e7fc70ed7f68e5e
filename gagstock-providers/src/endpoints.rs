//! Provider endpoint configuration

use std::env;
use std::time::Duration;

use gagstock_core::Provider;

use crate::error::ProviderError;

const DEFAULT_GEAR_SEEDS_URL: &str = "https://growagardenstock.com/api/stock?type=gear-seeds";
const DEFAULT_EGG_URL: &str = "https://growagardenstock.com/api/stock?type=egg";
const DEFAULT_WEATHER_URL: &str = "https://growagardenstock.com/api/stock/weather";
const DEFAULT_HONEY_URL: &str = "http://65.108.103.151:22377/api/stocks?type=honeyStock";
const DEFAULT_COSMETICS_URL: &str = "https://growagardenstock.com/api/special-stock?type=cosmetics";
const DEFAULT_SEED_EMOJI_URL: &str = "http://65.108.103.151:22377/api/stocks?type=seedsStock";

/// Default per-request timeout (in seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// One URL per provider plus the per-request timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub gear_seeds: String,
    pub egg: String,
    pub weather: String,
    pub honey: String,
    pub cosmetics: String,
    pub seed_emoji: String,
    pub timeout: Duration,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            gear_seeds: DEFAULT_GEAR_SEEDS_URL.to_string(),
            egg: DEFAULT_EGG_URL.to_string(),
            weather: DEFAULT_WEATHER_URL.to_string(),
            honey: DEFAULT_HONEY_URL.to_string(),
            cosmetics: DEFAULT_COSMETICS_URL.to_string(),
            seed_emoji: DEFAULT_SEED_EMOJI_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProviderEndpoints {
    /// Load endpoints from environment variables, falling back to the public feeds
    ///
    /// Reads `GAGSTOCK_GEAR_SEEDS_URL`, `GAGSTOCK_EGG_URL`, `GAGSTOCK_WEATHER_URL`,
    /// `GAGSTOCK_HONEY_URL`, `GAGSTOCK_COSMETICS_URL`, `GAGSTOCK_SEED_EMOJI_URL`
    /// and `GAGSTOCK_PROVIDER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ProviderError> {
        let defaults = Self::default();

        let timeout = match env::var("GAGSTOCK_PROVIDER_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ProviderError::InvalidConfig(format!(
                        "GAGSTOCK_PROVIDER_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                if secs == 0 {
                    return Err(ProviderError::InvalidConfig(
                        "GAGSTOCK_PROVIDER_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            Err(_) => defaults.timeout,
        };

        let endpoints = Self {
            gear_seeds: url_from_env("GAGSTOCK_GEAR_SEEDS_URL", defaults.gear_seeds),
            egg: url_from_env("GAGSTOCK_EGG_URL", defaults.egg),
            weather: url_from_env("GAGSTOCK_WEATHER_URL", defaults.weather),
            honey: url_from_env("GAGSTOCK_HONEY_URL", defaults.honey),
            cosmetics: url_from_env("GAGSTOCK_COSMETICS_URL", defaults.cosmetics),
            seed_emoji: url_from_env("GAGSTOCK_SEED_EMOJI_URL", defaults.seed_emoji),
            timeout,
        };
        endpoints.validate()?;

        Ok(endpoints)
    }

    /// Endpoints sharing one base URL, using the public feeds' paths
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            gear_seeds: format!("{}/api/stock?type=gear-seeds", base),
            egg: format!("{}/api/stock?type=egg", base),
            weather: format!("{}/api/stock/weather", base),
            honey: format!("{}/api/stocks?type=honeyStock", base),
            cosmetics: format!("{}/api/special-stock?type=cosmetics", base),
            seed_emoji: format!("{}/api/stocks?type=seedsStock", base),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL for a provider
    pub fn url(&self, provider: Provider) -> &str {
        match provider {
            Provider::GearSeeds => &self.gear_seeds,
            Provider::Eggs => &self.egg,
            Provider::Weather => &self.weather,
            Provider::Honey => &self.honey,
            Provider::Cosmetics => &self.cosmetics,
            Provider::SeedEmoji => &self.seed_emoji,
        }
    }

    /// Check that every endpoint is an absolute http(s) URL
    pub fn validate(&self) -> Result<(), ProviderError> {
        for provider in Provider::ALL {
            let raw = self.url(provider);
            let parsed = url::Url::parse(raw).map_err(|e| {
                ProviderError::InvalidConfig(format!("{} endpoint '{}': {}", provider, raw, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ProviderError::InvalidConfig(format!(
                    "{} endpoint '{}' must use http or https",
                    provider, raw
                )));
            }
        }
        Ok(())
    }
}

fn url_from_env(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let endpoints = ProviderEndpoints::default();
        assert!(endpoints.validate().is_ok());
        assert_eq!(endpoints.timeout, Duration::from_secs(10));
        assert!(endpoints.url(Provider::Honey).ends_with("type=honeyStock"));
    }

    #[test]
    fn test_with_base_url() {
        let endpoints = ProviderEndpoints::with_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            endpoints.url(Provider::GearSeeds),
            "http://127.0.0.1:8080/api/stock?type=gear-seeds"
        );
        assert_eq!(
            endpoints.url(Provider::SeedEmoji),
            "http://127.0.0.1:8080/api/stocks?type=seedsStock"
        );
        assert!(endpoints.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_urls() {
        let endpoints = ProviderEndpoints {
            egg: "ftp://example.com/egg".to_string(),
            ..ProviderEndpoints::default()
        };
        assert!(matches!(
            endpoints.validate(),
            Err(ProviderError::InvalidConfig(_))
        ));

        let endpoints = ProviderEndpoints {
            weather: "not a url".to_string(),
            ..ProviderEndpoints::default()
        };
        assert!(endpoints.validate().is_err());
    }
}
