//! Rate table caching with TTL support.
//!
//! Tables are bucketed by the lowercase base ("from") code: one fetch per
//! base amortizes across every target a fan-out asks for. Stale entries are
//! treated as misses and overwritten by the next successful fetch; they are
//! never explicitly deleted, and failures are never cached.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use quickfx_common::Currency;
use rust_decimal::Decimal;
use tracing::debug;

/// A fetched rate table for one base currency.
pub type RateTable = HashMap<String, Decimal>;

#[derive(Debug, Clone)]
struct TableEntry {
    rates: Arc<RateTable>,
    fetched_at: DateTime<Utc>,
}

/// Configuration for the rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// How long a fetched table stays fresh.
    pub ttl: Duration,
}

impl RateCacheConfig {
    /// Build a config from a TTL in hours, clamped to [0.5, 24].
    pub fn from_hours(hours: f64) -> Self {
        let clamped = if hours.is_finite() {
            hours.clamp(0.5, 24.0)
        } else {
            3.0
        };
        Self {
            ttl: Duration::seconds((clamped * 3600.0) as i64),
        }
    }
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self::from_hours(3.0)
    }
}

/// Thread-safe rate table cache with TTL.
pub struct RateCache {
    buckets: DashMap<String, TableEntry>,
    config: RateCacheConfig,
}

impl RateCache {
    /// Create a new rate cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    /// Create a new rate cache with custom configuration.
    pub fn with_config(config: RateCacheConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            config,
        }
    }

    /// Get the cached table for a base currency while it is fresh.
    pub fn get(&self, from: &Currency) -> Option<Arc<RateTable>> {
        if let Some(entry) = self.buckets.get(from.code()) {
            let age = Utc::now().signed_duration_since(entry.fetched_at);
            if age < self.config.ttl {
                debug!(from = %from, "cache hit");
                return Some(Arc::clone(&entry.rates));
            }
            debug!(from = %from, "cache entry stale");
            return None;
        }

        debug!(from = %from, "cache miss");
        None
    }

    /// Store a freshly fetched table, returning a handle for immediate use.
    /// Racing writers for the same base are benign: the tables are
    /// idempotent, last-writer-wins.
    pub fn insert(&self, from: &Currency, rates: RateTable) -> Arc<RateTable> {
        let rates = Arc::new(rates);
        let entry = TableEntry {
            rates: Arc::clone(&rates),
            fetched_at: Utc::now(),
        };
        self.buckets.insert(from.code().to_string(), entry);
        rates
    }

    /// Number of cached base buckets (fresh or stale).
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}
