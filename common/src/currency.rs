//! Currency codes and pairs for QuickFx.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A currency code.
///
/// Codes are normalized to lowercase on construction and used as cache and
/// alias keys; `display_code` gives the uppercase form shown to the user.
/// Anything the rate source accepts is a valid code (ISO 4217 fiat codes as
/// well as crypto tickers like `btc`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_lowercase())
    }

    /// Get the canonical (lowercase) currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Get the uppercase code used for display.
    pub fn display_code(&self) -> String {
        self.0.to_uppercase()
    }

    /// Check if the code is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_code())
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An ordered (from, to) currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency being converted from; also the cache bucket key.
    pub from: Currency,
    /// Currency being converted to.
    pub to: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(from: Currency, to: Currency) -> Self {
        Self { from, to }
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }

    /// A pair converting a currency to itself produces no result.
    pub fn is_self_conversion(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}
