//! Converter error types.
//!
//! Every variant carries the user-facing message in its `Display` output;
//! the fan-out resolver turns these directly into warning results. None of
//! them is fatal to the process.

use thiserror::Error;

/// Errors that can occur while resolving a conversion query.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Malformed arithmetic expression.
    #[error("Invalid expression provided")]
    InvalidExpression,

    /// Division by a literal zero inside the amount expression.
    #[error("Cannot divide by zero")]
    DivideByZero,

    /// A character outside the expression grammar.
    #[error("Unrecognized '{0}' in expression")]
    UnknownToken(char),

    /// The rate source has no such currency code.
    #[error("{} is not a valid currency", .0.to_uppercase())]
    UnknownCurrency(String),

    /// Network or parse failure while fetching rates. The reason is kept for
    /// logging; the displayed message stays generic.
    #[error("Something went wrong while fetching the conversion rate")]
    FetchFailed(String),

    /// The alias file is missing at the configured path.
    #[error("Alias file not found")]
    AliasFileNotFound,

    /// The alias file exists but is not valid JSON.
    #[error("Alias file is not valid JSON")]
    AliasFileInvalidJson,

    /// Invalid converter configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for converter operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_currency_message_is_uppercased() {
        let err = ConvertError::UnknownCurrency("xyz".to_string());
        assert_eq!(err.to_string(), "XYZ is not a valid currency");
    }

    #[test]
    fn test_fetch_failed_message_stays_generic() {
        let err = ConvertError::FetchFailed("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Something went wrong while fetching the conversion rate"
        );
    }
}
