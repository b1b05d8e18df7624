//! Free-text query parsing.
//!
//! The grammar is `[amount] [from] [to|in] [to]`, where the amount is an
//! arithmetic expression and the amount/currency order may be swapped
//! (`100 usd to eur`, `eur 100 in usd`). The pattern is built from the
//! configured separators, so the same characters that render amounts are
//! legal inside typed ones. Input that does not match the grammar is not an
//! error; it simply produces no results.

use quickfx_common::NumberFormat;
use regex::Regex;

use crate::error::{ConvertError, ConvertResult};

/// Character class for currency tokens: letters, currency symbols,
/// underscore.
const CURRENCY_TOKEN: &str = r"[\p{L}\p{Sc}_]*";

/// A query split into its raw parts. Currency tokens are trimmed and
/// lowercased; the amount expression still needs evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Amount expression with group separators already stripped.
    pub amount_expression: String,
    /// From-currency token, possibly empty.
    pub from: String,
    /// To-currency token, possibly empty.
    pub to: String,
}

/// Compiled query grammar for one separator configuration.
pub struct QueryParser {
    regex: Regex,
    group_separator: String,
}

impl QueryParser {
    /// Build the parser for the given separators.
    pub fn new(format: &NumberFormat) -> ConvertResult<Self> {
        let decimal = regex::escape(&format.decimal_separator);
        let group = regex::escape(&format.group_separator);
        let amount = format!(r"(?:[0-9\s+\-*/()]|{decimal}|{group})+");

        let pattern = format!(
            r"^\s*(?:(?P<amount1>{a})\s*(?P<from1>{c})|(?P<from2>{c})\s*(?P<amount2>{a}))\s*(?:to|in)?\s*(?P<to>{c})\s*$",
            a = amount,
            c = CURRENCY_TOKEN,
        );

        let regex = Regex::new(&pattern).map_err(|e| ConvertError::Config(e.to_string()))?;
        Ok(Self {
            regex,
            group_separator: format.group_separator.clone(),
        })
    }

    /// Split a search string into amount expression and currency tokens.
    /// Returns `None` when the input is not a conversion query.
    pub fn parse(&self, search: &str) -> Option<ParsedQuery> {
        let captures = self.regex.captures(search.trim())?;

        let (amount, from) = match captures.name("amount1") {
            Some(amount) => (
                amount.as_str(),
                captures.name("from1").map_or("", |m| m.as_str()),
            ),
            None => (
                captures.name("amount2")?.as_str(),
                captures.name("from2").map_or("", |m| m.as_str()),
            ),
        };

        Some(ParsedQuery {
            amount_expression: amount.replace(&self.group_separator, ""),
            from: from.trim().to_lowercase(),
            to: captures
                .name("to")
                .map_or("", |m| m.as_str())
                .trim()
                .to_lowercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> QueryParser {
        QueryParser::new(&NumberFormat::dot_decimal()).unwrap()
    }

    #[test]
    fn test_full_query() {
        let parsed = parser().parse("100 usd to eur").unwrap();
        assert_eq!(parsed.amount_expression, "100 ");
        assert_eq!(parsed.from, "usd");
        assert_eq!(parsed.to, "eur");
    }

    #[test]
    fn test_currency_first_order() {
        let parsed = parser().parse("eur 100 in usd").unwrap();
        assert_eq!(parsed.amount_expression.trim(), "100");
        assert_eq!(parsed.from, "eur");
        assert_eq!(parsed.to, "usd");
    }

    #[test]
    fn test_amount_only() {
        let parsed = parser().parse("100").unwrap();
        assert_eq!(parsed.amount_expression, "100");
        assert_eq!(parsed.from, "");
        assert_eq!(parsed.to, "");
    }

    #[test]
    fn test_from_only_without_keyword() {
        let parsed = parser().parse("250.5 GBP").unwrap();
        assert_eq!(parsed.amount_expression, "250.5 ");
        assert_eq!(parsed.from, "gbp");
        assert_eq!(parsed.to, "");
    }

    #[test]
    fn test_expression_amount() {
        let parsed = parser().parse("(100+20)*2 usd to eur").unwrap();
        assert_eq!(parsed.amount_expression, "(100+20)*2 ");
        assert_eq!(parsed.from, "usd");
        assert_eq!(parsed.to, "eur");
    }

    #[test]
    fn test_group_separators_are_stripped() {
        let parsed = parser().parse("1,000.50 usd to eur").unwrap();
        assert_eq!(parsed.amount_expression, "1000.50 ");
    }

    #[test]
    fn test_currency_symbols_as_tokens() {
        let parsed = parser().parse("100 $ to €").unwrap();
        assert_eq!(parsed.from, "$");
        assert_eq!(parsed.to, "€");
    }

    #[test]
    fn test_non_queries_do_not_match() {
        assert!(parser().parse("hello world").is_none());
        assert!(parser().parse("usd").is_none());
        assert!(parser().parse("").is_none());
    }
}
