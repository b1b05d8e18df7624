//! Conversion results handed back to the host.

use quickfx_common::CurrencyPair;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::OutputStyle;
use crate::error::ConvertError;
use crate::format::Rendered;

/// Link shown with alias-file warnings.
pub const ALIAS_HELP_LINK: &str = "https://github.com/quickfx/quickfx#aliasing";

/// What a result represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// A computed conversion.
    Success,
    /// The rate source does not know one of the codes.
    CurrencyNotFound,
    /// Network or parse failure while fetching rates.
    FetchError,
    /// The typed amount expression was malformed.
    InvalidExpression,
    /// The configured alias file is missing or corrupt.
    AliasFile,
}

impl From<&ConvertError> for Outcome {
    fn from(error: &ConvertError) -> Self {
        match error {
            ConvertError::InvalidExpression
            | ConvertError::DivideByZero
            | ConvertError::UnknownToken(_) => Outcome::InvalidExpression,
            ConvertError::UnknownCurrency(_) => Outcome::CurrencyNotFound,
            ConvertError::FetchFailed(_) | ConvertError::Config(_) => Outcome::FetchError,
            ConvertError::AliasFileNotFound | ConvertError::AliasFileInvalidJson => {
                Outcome::AliasFile
            }
        }
    }
}

/// The numeric payload of a successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// The converted pair, after alias resolution.
    pub pair: CurrencyPair,
    /// Input amount.
    pub amount: Decimal,
    /// Converted amount, sign matching the input.
    pub converted: Decimal,
    /// Display precision used for `converted`.
    pub precision: u32,
    /// `92.00 EUR`
    pub compact: String,
    /// `100.00 USD = 92.00 EUR`
    pub expanded: String,
}

/// One entry in the list shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    /// Primary display line.
    pub title: String,
    /// Secondary display line.
    pub subtitle: String,
    /// What this result represents.
    pub outcome: Outcome,
    /// Numeric payload, present on success.
    pub conversion: Option<Conversion>,
    /// Help link for warning results.
    pub link: Option<String>,
}

impl ConversionResult {
    /// A successful conversion; the output style picks which rendered form
    /// becomes the title.
    pub fn success(pair: CurrencyPair, amount: Decimal, rendered: Rendered, style: OutputStyle) -> Self {
        let subtitle = format!(
            "Currency conversion from {} to {}",
            pair.from.display_code(),
            pair.to.display_code()
        );
        let title = match style {
            OutputStyle::Compact => rendered.compact.clone(),
            OutputStyle::Expanded => rendered.expanded.clone(),
        };
        Self {
            title,
            subtitle,
            outcome: Outcome::Success,
            conversion: Some(Conversion {
                pair,
                amount,
                converted: rendered.converted,
                precision: rendered.precision,
                compact: rendered.compact,
                expanded: rendered.expanded,
            }),
            link: None,
        }
    }

    /// A per-pair warning carrying the error message and the rate source's
    /// supported-currency list.
    pub fn warning(error: &ConvertError, helper_link: &str) -> Self {
        Self {
            title: error.to_string(),
            subtitle: "Press enter or click to open the currencies list".to_string(),
            outcome: Outcome::from(error),
            conversion: None,
            link: Some(helper_link.to_string()),
        }
    }

    /// The warning shown when the typed amount fails to evaluate.
    pub fn invalid_expression(error: &ConvertError) -> Self {
        Self {
            title: error.to_string(),
            subtitle: "Please check your mathematical expression".to_string(),
            outcome: Outcome::from(error),
            conversion: None,
            link: None,
        }
    }

    /// The always-shown warning for a broken alias file.
    pub fn alias_warning(error: &ConvertError) -> Self {
        Self {
            title: error.to_string(),
            subtitle: "Press enter or click to see how to fix this issue".to_string(),
            outcome: Outcome::AliasFile,
            conversion: None,
            link: Some(ALIAS_HELP_LINK.to_string()),
        }
    }
}

/// De-duplicate by (title, subtitle), keeping the first occurrence. Relies on
/// the resolver's deterministic enumeration order.
pub fn dedup(results: Vec<ConversionResult>) -> Vec<ConversionResult> {
    let mut seen = std::collections::HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert((r.title.clone(), r.subtitle.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(title: &str) -> ConversionResult {
        ConversionResult {
            title: title.to_string(),
            subtitle: "sub".to_string(),
            outcome: Outcome::FetchError,
            conversion: None,
            link: None,
        }
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let results = vec![warning("a"), warning("b"), warning("a")];
        let deduped = dedup(results);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, "a");
        assert_eq!(deduped[1].title, "b");
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(
            Outcome::from(&ConvertError::DivideByZero),
            Outcome::InvalidExpression
        );
        assert_eq!(
            Outcome::from(&ConvertError::UnknownCurrency("xyz".into())),
            Outcome::CurrencyNotFound
        );
        assert_eq!(
            Outcome::from(&ConvertError::AliasFileInvalidJson),
            Outcome::AliasFile
        );
    }
}
