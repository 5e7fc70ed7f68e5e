//! Upstream stock site client
//!
//! Fetches the richer "all stock" payload and the weather statistics from the
//! game's stock site. The all-stock payload is reshaped into categorized lists,
//! each item annotated with its image when the payload's `imageData` map has one.

use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::ProviderError;

const DEFAULT_UPSTREAM_BASE_URL: &str = "https://growagarden.gg";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

/// Shop item with optional image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockEntry {
    pub name: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Recently seen item with optional image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastSeenEntry {
    pub name: String,
    pub emoji: String,
    pub seen: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Recently seen items per category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LastSeen {
    pub seeds: Vec<LastSeenEntry>,
    pub gears: Vec<LastSeenEntry>,
    pub weather: Vec<LastSeenEntry>,
    pub eggs: Vec<LastSeenEntry>,
    pub honey: Vec<LastSeenEntry>,
}

/// Categorized all-stock response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedStocks {
    pub easter_stock: Vec<StockEntry>,
    pub gear_stock: Vec<StockEntry>,
    pub egg_stock: Vec<StockEntry>,
    pub night_stock: Vec<StockEntry>,
    pub honey_stock: Vec<StockEntry>,
    pub cosmetics_stock: Vec<StockEntry>,
    pub seeds_stock: Vec<StockEntry>,
    pub last_seen: LastSeen,
    pub restock_timers: Value,
}

/// Non-empty string field of a JSON object
fn str_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn image_for(item: &Value, images: &Value) -> Option<String> {
    let name = str_field(item, "name")?;
    images
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn items(list: Option<&Value>) -> &[Value] {
    list.and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn format_stock_items(list: Option<&Value>, images: &Value) -> Vec<StockEntry> {
    items(list)
        .iter()
        .map(|item| StockEntry {
            name: str_field(item, "name").unwrap_or("Unknown Item").to_string(),
            value: item.get("value").cloned().unwrap_or(Value::Null),
            image: image_for(item, images),
        })
        .collect()
}

fn format_last_seen_items(list: Option<&Value>, images: &Value) -> Vec<LastSeenEntry> {
    items(list)
        .iter()
        .map(|item| LastSeenEntry {
            name: str_field(item, "name").unwrap_or("Unknown").to_string(),
            emoji: str_field(item, "emoji").unwrap_or("❓").to_string(),
            seen: item.get("seen").cloned().unwrap_or(Value::Null),
            image: image_for(item, images),
        })
        .collect()
}

/// Reshape a raw all-stock payload into categorized lists
pub fn format_stocks(raw: &Value) -> FormattedStocks {
    let empty = json!({});
    let images = raw.get("imageData").filter(|v| v.is_object()).unwrap_or(&empty);
    let last_seen = raw.get("lastSeen");
    let seen = |key: &str| format_last_seen_items(last_seen.and_then(|l| l.get(key)), images);

    let restock_timers = match raw.get("restockTimers") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => json!({}),
        Some(timers) => timers.clone(),
    };

    FormattedStocks {
        easter_stock: format_stock_items(raw.get("easterStock"), images),
        gear_stock: format_stock_items(raw.get("gearStock"), images),
        egg_stock: format_stock_items(raw.get("eggStock"), images),
        night_stock: format_stock_items(raw.get("nightStock"), images),
        honey_stock: format_stock_items(raw.get("honeyStock"), images),
        cosmetics_stock: format_stock_items(raw.get("cosmeticsStock"), images),
        seeds_stock: format_stock_items(raw.get("seedsStock"), images),
        last_seen: LastSeen {
            seeds: seen("Seeds"),
            gears: seen("Gears"),
            weather: seen("Weather"),
            eggs: seen("Eggs"),
            honey: seen("Honey"),
        },
        restock_timers,
    }
}

/// Client for the upstream stock site
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a client against the public stock site
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_UPSTREAM_BASE_URL)
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Load the base URL from `GAGSTOCK_UPSTREAM_BASE_URL`, falling back to the public site
    pub fn from_env() -> Self {
        match std::env::var("GAGSTOCK_UPSTREAM_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(url.trim()),
            _ => Self::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and reshape the all-stock payload
    pub async fn fetch_all_stock(&self) -> Result<FormattedStocks, ProviderError> {
        let url = format!("{}/api/stock", self.base_url);
        let request = self
            .client
            .get(&url)
            .header("accept", "*/*")
            .header("accept-language", "en-US,en;q=0.9")
            .header("content-type", "application/json")
            .header("priority", "u=1, i")
            .header("referer", format!("{}/stocks", self.base_url))
            .header("trpc-accept", "application/json")
            .header("x-trpc-source", "gag");

        let raw = self.get_json(request, &url).await.inspect_err(|e| {
            error!("Error fetching stock data: {}", e);
        })?;

        Ok(format_stocks(&raw))
    }

    /// Fetch the weather statistics verbatim
    pub async fn fetch_weather_stats(&self) -> Result<Value, ProviderError> {
        let url = format!("{}/api/weather/stats", self.base_url);
        let request = self
            .client
            .get(&url)
            .header("accept", "*/*")
            .header("accept-language", "en-US,en;q=0.9")
            .header("priority", "u=1, i")
            .header("referer", format!("{}/weather", self.base_url))
            .header("user-agent", BROWSER_USER_AGENT)
            .header("sec-fetch-dest", "empty")
            .header("sec-fetch-mode", "cors")
            .header("sec-fetch-site", "same-origin");

        self.get_json(request, &url).await
    }

    async fn get_json(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Value, ProviderError> {
        debug!("Fetching upstream {}", url);

        let response = request.send().await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body)
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse JSON: {}", e)))
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}
