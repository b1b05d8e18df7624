//! Converted-amount rounding and display rendering.

use quickfx_common::{Currency, NumberFormat};
use rust_decimal::Decimal;

use crate::error::{ConvertError, ConvertResult};

/// A conversion rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Converted amount, rounded to `precision` and carrying the sign of the
    /// input amount.
    pub converted: Decimal,
    /// Display precision actually used.
    pub precision: u32,
    /// `92.00 EUR`
    pub compact: String,
    /// `100.00 USD = 92.00 EUR`
    pub expanded: String,
}

/// Round `|amount × rate|` to the base precision, extending the precision by
/// the number of leading zero decimal digits when the raw result is below 1,
/// so converting into a high-value currency never displays as `0.00`. Up to
/// ten decimal digits of the raw value are examined.
pub fn converted_amount(
    amount: Decimal,
    rate: Decimal,
    base_precision: u32,
) -> ConvertResult<(Decimal, u32)> {
    let raw = amount
        .checked_mul(rate)
        .ok_or(ConvertError::InvalidExpression)?
        .abs();

    let mut precision = base_precision;
    let mut converted = raw.round_dp(precision);

    if raw < Decimal::ONE {
        let fixed = format!("{:.10}", raw);
        if let Some((_, fraction)) = fixed.split_once('.') {
            let zeros = fraction.chars().take_while(|&c| c == '0').count() as u32;
            precision = base_precision + zeros;
            converted = raw.round_dp(precision);
        }
    }

    Ok((converted, precision))
}

/// Render both output forms for one conversion.
pub fn render(
    amount: Decimal,
    rate: Decimal,
    from: &Currency,
    to: &Currency,
    base_precision: u32,
    format: &NumberFormat,
) -> ConvertResult<Rendered> {
    let (converted, precision) = converted_amount(amount, rate, base_precision)?;
    let signed = if amount.is_sign_negative() && !converted.is_zero() {
        -converted
    } else {
        converted
    };

    let from_text = format.format(amount, base_precision);
    let to_text = format.format(signed, precision);

    let compact = format!("{} {}", to_text, to.display_code());
    let expanded = format!(
        "{} {} = {} {}",
        from_text,
        from.display_code(),
        to_text,
        to.display_code()
    );

    Ok(Rendered {
        converted: signed,
        precision,
        compact,
        expanded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_base_precision_rounding() {
        let (converted, precision) = converted_amount(dec!(100), dec!(0.92), 2).unwrap();
        assert_eq!(converted, dec!(92.00));
        assert_eq!(precision, 2);
    }

    #[test]
    fn test_small_amount_extends_precision() {
        // 1 * 0.00031 has three leading zero decimals; display precision
        // becomes 2 + 3 = 5 and the value survives rounding.
        let (converted, precision) = converted_amount(dec!(1), dec!(0.00031), 2).unwrap();
        assert_eq!(precision, 5);
        assert_eq!(converted, dec!(0.00031));
    }

    #[test]
    fn test_small_amount_never_renders_as_zero() {
        let rendered = render(
            dec!(1),
            dec!(0.00031),
            &Currency::new("usd"),
            &Currency::new("btc"),
            2,
            &NumberFormat::dot_decimal(),
        )
        .unwrap();
        assert_eq!(rendered.compact, "0.00031 BTC");
    }

    #[test]
    fn test_sign_is_reapplied() {
        let rendered = render(
            dec!(-100),
            dec!(0.92),
            &Currency::new("usd"),
            &Currency::new("eur"),
            2,
            &NumberFormat::dot_decimal(),
        )
        .unwrap();
        assert_eq!(rendered.converted, dec!(-92.00));
        assert_eq!(rendered.compact, "-92.00 EUR");
        assert_eq!(rendered.expanded, "-100.00 USD = -92.00 EUR");
    }

    #[test]
    fn test_compact_and_expanded_forms() {
        let rendered = render(
            dec!(100),
            dec!(0.92),
            &Currency::new("usd"),
            &Currency::new("eur"),
            2,
            &NumberFormat::dot_decimal(),
        )
        .unwrap();
        assert_eq!(rendered.compact, "92.00 EUR");
        assert_eq!(rendered.expanded, "100.00 USD = 92.00 EUR");
    }

    #[test]
    fn test_grouped_output() {
        let rendered = render(
            dec!(10000),
            dec!(83.2),
            &Currency::new("usd"),
            &Currency::new("inr"),
            2,
            &NumberFormat::dot_decimal(),
        )
        .unwrap();
        assert_eq!(rendered.compact, "832,000.00 INR");
        assert_eq!(rendered.expanded, "10,000.00 USD = 832,000.00 INR");
    }
}
