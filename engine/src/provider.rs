//! Rate provider trait and implementations.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::RateTable;
use crate::error::{ConvertError, ConvertResult};
use crate::profile::ApiProfile;

/// A source of exchange rate tables.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch the full rate table for a base currency (lowercase code).
    ///
    /// Fails with [`ConvertError::UnknownCurrency`] when the source has no
    /// such base code and [`ConvertError::FetchFailed`] on network or parse
    /// failure. Implementations must return the entire table so one fetch
    /// serves every target a fan-out asks for.
    async fn fetch_table(&self, from: &str) -> ConvertResult<RateTable>;
}

enum Attempt {
    Success(reqwest::Response),
    NotFound,
    Failed(String),
}

/// Fetches rate tables over HTTP from the endpoints of an [`ApiProfile`],
/// falling back to the profile's secondary endpoint when the primary fails
/// for any reason other than an unknown base currency.
pub struct HttpRateProvider {
    client: reqwest::Client,
    profile: ApiProfile,
    date: String,
    api_key: String,
}

impl HttpRateProvider {
    /// Create a provider for the given profile. `date` is the rate snapshot
    /// token (usually "latest").
    pub fn new(
        profile: ApiProfile,
        date: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> ConvertResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConvertError::Config(e.to_string()))?;
        Ok(Self {
            client,
            profile,
            date: date.into(),
            api_key: api_key.into(),
        })
    }

    async fn attempt(&self, url: &str) -> Attempt {
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => Attempt::Success(response),
            Ok(response) if response.status() == StatusCode::NOT_FOUND => Attempt::NotFound,
            Ok(response) => Attempt::Failed(format!("HTTP {}", response.status())),
            Err(e) => Attempt::Failed(e.to_string()),
        }
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_table(&self, from: &str) -> ConvertResult<RateTable> {
        let url = self.profile.conversion_url(from, "", &self.date, &self.api_key);
        debug!(from, url = %url, "fetching rate table");

        let response = match self.attempt(&url).await {
            Attempt::Success(response) => response,
            Attempt::NotFound => return Err(ConvertError::UnknownCurrency(from.to_string())),
            Attempt::Failed(reason) => {
                let fallback = self.profile.fallback_url(from, "", &self.date, &self.api_key);
                warn!(from, reason, fallback = %fallback, "primary endpoint failed, trying fallback");

                match self.attempt(&fallback).await {
                    Attempt::Success(response) => response,
                    Attempt::NotFound => {
                        return Err(ConvertError::UnknownCurrency(from.to_string()))
                    }
                    Attempt::Failed(reason) => return Err(ConvertError::FetchFailed(reason)),
                }
            }
        };

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ConvertError::FetchFailed(e.to_string()))?;

        self.profile.shape().extract(&body, from)
    }
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    tables: dashmap::DashMap<String, RateTable>,
    delays: dashmap::DashMap<String, u64>,
    fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: dashmap::DashMap::new(),
            delays: dashmap::DashMap::new(),
            fetches: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Set a single rate, creating the base bucket if needed.
    pub fn set_rate(&self, from: &str, to: &str, rate: rust_decimal::Decimal) {
        self.tables
            .entry(from.to_lowercase())
            .or_default()
            .insert(to.to_lowercase(), rate);
    }

    /// Inject artificial latency (ms) into fetches for one base currency.
    pub fn set_delay(&self, from: &str, millis: u64) {
        self.delays.insert(from.to_lowercase(), millis);
    }

    /// Number of fetches issued so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_table(&self, from: &str) -> ConvertResult<RateTable> {
        self.fetches
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let delay = self.delays.get(from).map(|millis| *millis);
        if let Some(millis) = delay {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }

        self.tables
            .get(from)
            .map(|table| table.value().clone())
            .ok_or_else(|| ConvertError::UnknownCurrency(from.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_provider_returns_full_table() {
        let provider = MockRateProvider::new("test");
        provider.set_rate("usd", "eur", dec!(0.92));
        provider.set_rate("usd", "gbp", dec!(0.79));

        let table = provider.fetch_table("usd").await.unwrap();

        assert_eq!(table.get("eur"), Some(&dec!(0.92)));
        assert_eq!(table.get("gbp"), Some(&dec!(0.79)));
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_unknown_base() {
        let provider = MockRateProvider::new("test");

        let result = provider.fetch_table("xyz").await;

        assert!(matches!(result, Err(ConvertError::UnknownCurrency(_))));
    }
}
