//! Converter configuration.
//!
//! Owned by the host; the engine only consumes it. Constructed once and
//! handed to [`crate::converter::Converter::new`].

use std::path::PathBuf;
use std::time::Duration;

use quickfx_common::NumberFormat;

use crate::cache::RateCacheConfig;
use crate::error::{ConvertError, ConvertResult};
use crate::profile::ApiProfile;

/// Which block of pairs leads when a fan-out runs in both directions, and
/// where the local-currency pair lands in from-only mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionDirection {
    /// Local→target pairs first; `from`→local leads in from-only mode.
    #[default]
    LocalFirst,
    /// Target→local pairs first; `from`→local trails in from-only mode.
    TargetFirst,
}

/// Which rendered string becomes the result title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// `92.00 EUR`
    #[default]
    Compact,
    /// `100.00 USD = 92.00 EUR`
    Expanded,
}

/// Main converter configuration.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// The user's local currency code.
    pub local_currency: String,
    /// Target currencies for fan-out, in display order.
    pub target_currencies: Vec<String>,
    /// Fan-out ordering.
    pub direction: ConversionDirection,
    /// Title style for successful results.
    pub output_style: OutputStyle,
    /// Base display precision (fraction digits).
    pub precision: u32,
    /// Decimal/group separators for parsing and rendering.
    pub number_format: NumberFormat,
    /// Cache TTL in hours; clamped to [0.5, 24] when read.
    pub cache_ttl_hours: f64,
    /// Rate API profile.
    pub profile: ApiProfile,
    /// Rate snapshot token, usually "latest".
    pub conversion_date: String,
    /// API key for profiles that need one.
    pub api_key: String,
    /// Show warning results even for ambient (global) searches.
    pub show_warnings_in_global: bool,
    /// Path to the alias file, if the host provides one.
    pub alias_path: Option<PathBuf>,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            local_currency: "usd".to_string(),
            target_currencies: vec!["eur".to_string(), "gbp".to_string()],
            direction: ConversionDirection::default(),
            output_style: OutputStyle::default(),
            precision: 2,
            number_format: NumberFormat::default(),
            cache_ttl_hours: 3.0,
            profile: ApiProfile::default(),
            conversion_date: "latest".to_string(),
            api_key: String::new(),
            show_warnings_in_global: false,
            alias_path: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ConverterConfig {
    /// Cache configuration with the TTL clamp applied.
    pub fn cache_config(&self) -> RateCacheConfig {
        RateCacheConfig::from_hours(self.cache_ttl_hours)
    }

    /// Validate configuration.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.local_currency.trim().is_empty() {
            return Err(ConvertError::Config(
                "local currency cannot be empty".to_string(),
            ));
        }

        if self.profile.requires_api_key() && self.api_key.is_empty() {
            return Err(ConvertError::Config(
                "conversion API key is not provided".to_string(),
            ));
        }

        // Decimal carries at most 28 fraction digits; the small-amount rule
        // can extend display precision past the base value.
        if self.precision > 10 {
            return Err(ConvertError::Config(
                "precision cannot exceed 10".to_string(),
            ));
        }

        Ok(())
    }
}
