//! QuickFx Engine
//!
//! Host-independent core of the QuickFx currency converter: parses a typed
//! search string, resolves currency aliases, fetches and caches exchange
//! rates, and formats human-readable conversion results.
//!
//! # Example
//!
//! ```rust,ignore
//! use quickfx_engine::{ApiProfile, Converter, ConverterConfig, HttpRateProvider};
//! use std::sync::Arc;
//!
//! let config = ConverterConfig::default();
//! let provider = Arc::new(HttpRateProvider::new(
//!     config.profile.clone(),
//!     &config.conversion_date,
//!     &config.api_key,
//!     config.request_timeout,
//! )?);
//!
//! let converter = Converter::new(config, provider)?;
//! let results = converter.search("100 usd to eur", false).await;
//! ```

pub mod alias;
pub mod cache;
pub mod calc;
pub mod config;
pub mod converter;
pub mod error;
pub mod format;
pub mod profile;
pub mod provider;
pub mod query;
pub mod result;

pub use alias::AliasTable;
pub use cache::{RateCache, RateCacheConfig, RateTable};
pub use config::{ConversionDirection, ConverterConfig, OutputStyle};
pub use converter::{ConversionRequest, Converter};
pub use error::{ConvertError, ConvertResult};
pub use profile::{ApiProfile, CustomEndpoints, ResponseShape};
pub use provider::{HttpRateProvider, RateProvider};
pub use query::{ParsedQuery, QueryParser};
pub use result::{Conversion, ConversionResult, Outcome};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
