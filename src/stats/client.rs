// src/stats/client.rs
//! HashVault wallet statistics client
//!
//! Fetches the per-wallet stats document and converts it into a
//! [`StatsSnapshot`]. No retries happen here; a failed fetch is reported
//! to the caller and the next scheduled cycle simply tries again.

use crate::types::{StatsSnapshot, WorkerStat};
use crate::utils::error::BotError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use url::Url;

/// Fixed query parameters sent with every stats request
const STATS_QUERY: [(&str, &str); 6] = [
    ("chart", "total"),
    ("inactivityThreshold", "10"),
    ("order", "name"),
    ("period", "daily"),
    ("poolType", "false"),
    ("workers", "true"),
];

/// Anything that can produce a fresh statistics snapshot
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetches one snapshot
    ///
    /// # Errors
    /// Returns `BotError::Upstream` on transport, status or shape failures
    async fn fetch(&self) -> Result<StatsSnapshot, BotError>;
}

/// HTTP client for the pool's wallet statistics endpoint
pub struct StatsClient {
    /// Fully built endpoint including query string
    endpoint: Url,
    /// HTTP client for making API requests
    client: Client,
}

impl StatsClient {
    /// Creates a client for the given wallet
    ///
    /// # Arguments
    /// * `api_base` - Pool API root (e.g. "https://api.hashvault.pro/v3/monero")
    /// * `wallet` - Wallet address whose stats are polled
    ///
    /// # Errors
    /// Returns `BotError::Url` if the base URL is invalid
    pub fn new(api_base: &str, wallet: &str) -> Result<Self, BotError> {
        let client = Client::builder()
            .user_agent(format!("hashvault_bot/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BotError::upstream("Failed to build HTTP client", e))?;

        Ok(StatsClient {
            endpoint: stats_url(api_base, wallet)?,
            client,
        })
    }

    /// The URL polled on every cycle
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl StatsSource for StatsClient {
    async fn fetch(&self) -> Result<StatsSnapshot, BotError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| BotError::upstream("Stats request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Upstream(format!(
                "Stats API returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BotError::upstream("Failed to read stats response", e))?;

        parse_stats(&body)
    }
}

/// Builds the stats endpoint URL for a wallet
pub fn stats_url(api_base: &str, wallet: &str) -> Result<Url, BotError> {
    let raw = format!(
        "{}/wallet/{}/stats",
        api_base.trim_end_matches('/'),
        wallet
    );
    Ok(Url::parse_with_params(&raw, STATS_QUERY)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    collective: Option<CollectiveStats>,
    revenue: Option<RevenueStats>,
    #[serde(default)]
    collective_workers: Option<Vec<RawWorker>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectiveStats {
    #[serde(default, deserialize_with = "lenient_number")]
    hash_rate: Option<Number>,
    #[serde(default, deserialize_with = "lenient_number")]
    valid_shares: Option<Number>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RevenueStats {
    #[serde(default, deserialize_with = "lenient_number")]
    confirmed_balance: Option<Number>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWorker {
    name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    hash_rate: Option<Number>,
    #[serde(default, deserialize_with = "lenient_number")]
    valid_shares: Option<Number>,
    #[serde(default, deserialize_with = "lenient_number")]
    stale_shares: Option<Number>,
    #[serde(default, deserialize_with = "lenient_number")]
    last_share: Option<Number>,
}

/// Accepts any JSON number; `null`, strings and other shapes read as absent
///
/// The pool occasionally reports a counter as `null` or as a float such as
/// `42.0`. One odd worker must not invalidate the whole snapshot.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => Some(n),
        _ => None,
    })
}

fn as_rate(value: Option<Number>) -> f64 {
    value
        .and_then(|n| n.as_f64())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn as_count(value: Option<Number>) -> Option<u64> {
    let n = value?;
    n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}

fn as_timestamp(value: Option<Number>) -> Option<DateTime<Utc>> {
    let n = value?;
    let raw = n
        .as_i64()
        .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))?;
    unix_timestamp(raw)
}

/// Parses a stats response body
///
/// # Errors
/// Returns `BotError::Upstream` if the body is not JSON of the expected
/// shape or lacks the `collective` or `revenue` objects
pub fn parse_stats(body: &str) -> Result<StatsSnapshot, BotError> {
    let raw: StatsResponse = serde_json::from_str(body)
        .map_err(|e| BotError::Upstream(format!("Malformed stats response: {}", e)))?;

    let collective = raw
        .collective
        .ok_or_else(|| BotError::Upstream("Missing collective stats".to_string()))?;
    let revenue = raw
        .revenue
        .ok_or_else(|| BotError::Upstream("Missing revenue info".to_string()))?;

    let workers = raw
        .collective_workers
        .unwrap_or_default()
        .into_iter()
        .map(|w| WorkerStat {
            name: w.name,
            hash_rate: as_rate(w.hash_rate),
            valid_shares: as_count(w.valid_shares).unwrap_or(0),
            stale_shares: as_count(w.stale_shares).unwrap_or(0),
            last_share: as_timestamp(w.last_share),
        })
        .collect();

    Ok(StatsSnapshot {
        hash_rate: as_rate(collective.hash_rate),
        valid_shares: as_count(collective.valid_shares).unwrap_or(0),
        confirmed_balance: as_count(revenue.confirmed_balance),
        workers,
    })
}

/// Interprets a pool timestamp; values above 10^12 are milliseconds
fn unix_timestamp(value: i64) -> Option<DateTime<Utc>> {
    match value {
        v if v <= 0 => None,
        v if v > 1_000_000_000_000 => DateTime::from_timestamp_millis(v),
        v => DateTime::from_timestamp(v, 0),
    }
}
