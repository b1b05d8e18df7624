//! Locale-aware number rendering.
//!
//! The same separator configuration drives both the query grammar (which
//! separators are legal inside a typed amount) and the rendered output, so it
//! lives in the common crate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal and group separators used for parsing and rendering amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    /// Separator between the integer and fractional part.
    pub decimal_separator: String,
    /// Separator between digit groups in the integer part.
    pub group_separator: String,
}

impl NumberFormat {
    /// `1,234.56` style.
    pub fn dot_decimal() -> Self {
        Self {
            decimal_separator: ".".to_string(),
            group_separator: ",".to_string(),
        }
    }

    /// `1.234,56` style.
    pub fn comma_decimal() -> Self {
        Self {
            decimal_separator: ",".to_string(),
            group_separator: ".".to_string(),
        }
    }

    /// Render a value with a fixed number of fraction digits, grouped
    /// integer part, and the configured separators.
    pub fn format(&self, value: Decimal, precision: u32) -> String {
        let rounded = value.round_dp(precision);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();

        let fixed = format!("{:.*}", precision as usize, rounded.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&self.group_digits(int_part));
        if let Some(frac) = frac_part {
            out.push_str(&self.decimal_separator);
            out.push_str(frac);
        }
        out
    }

    fn group_digits(&self, digits: &str) -> String {
        if self.group_separator.is_empty() || digits.len() <= 3 {
            return digits.to_string();
        }

        let mut grouped = String::new();
        for (i, c) in digits.chars().enumerate() {
            let remaining = digits.len() - i;
            if i > 0 && remaining % 3 == 0 {
                grouped.push_str(&self.group_separator);
            }
            grouped.push(c);
        }
        grouped
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::dot_decimal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_grouping() {
        let format = NumberFormat::dot_decimal();
        assert_eq!(format.format(dec!(1234567.891), 2), "1,234,567.89");
        assert_eq!(format.format(dec!(100), 2), "100.00");
        assert_eq!(format.format(dec!(999), 0), "999");
        assert_eq!(format.format(dec!(1000), 0), "1,000");
    }

    #[test]
    fn test_format_comma_decimal() {
        let format = NumberFormat::comma_decimal();
        assert_eq!(format.format(dec!(1234.5), 2), "1.234,50");
    }

    #[test]
    fn test_format_negative() {
        let format = NumberFormat::dot_decimal();
        assert_eq!(format.format(dec!(-92), 2), "-92.00");
        // A value that rounds to zero loses its sign.
        assert_eq!(format.format(dec!(-0.001), 2), "0.00");
    }

    #[test]
    fn test_format_extended_precision() {
        let format = NumberFormat::dot_decimal();
        assert_eq!(format.format(dec!(0.00031), 5), "0.00031");
    }
}
