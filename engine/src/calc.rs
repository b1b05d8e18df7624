//! Arithmetic evaluation of typed amount expressions.
//!
//! A two-stack shunting-yard evaluator over `Decimal` values. The query
//! grammar reuses the configured decimal separator, so `1,5` and `1.5` are
//! both legal amounts depending on the active [`NumberFormat`]. Digit runs
//! may contain embedded whitespace (`1 000 000`); group separators are
//! stripped by the query parser before the expression reaches this module.

use quickfx_common::NumberFormat;
use rust_decimal::Decimal;

use crate::error::{ConvertError, ConvertResult};

fn precedence(op: char) -> u8 {
    match op {
        '+' | '-' => 1,
        '*' | '/' => 2,
        _ => 0,
    }
}

fn apply_op(op: char, b: Decimal, a: Decimal) -> ConvertResult<Decimal> {
    match op {
        '+' => a.checked_add(b).ok_or(ConvertError::InvalidExpression),
        '-' => a.checked_sub(b).ok_or(ConvertError::InvalidExpression),
        '*' => a.checked_mul(b).ok_or(ConvertError::InvalidExpression),
        '/' if b.is_zero() => Err(ConvertError::DivideByZero),
        '/' => a.checked_div(b).ok_or(ConvertError::InvalidExpression),
        _ => Err(ConvertError::InvalidExpression),
    }
}

fn apply_top(values: &mut Vec<Decimal>, ops: &mut Vec<char>) -> ConvertResult<()> {
    let op = ops.pop().ok_or(ConvertError::InvalidExpression)?;
    let b = values.pop().ok_or(ConvertError::InvalidExpression)?;
    let a = values.pop().ok_or(ConvertError::InvalidExpression)?;
    values.push(apply_op(op, b, a)?);
    Ok(())
}

/// Evaluate a restricted infix expression (`+ - * /`, parentheses) into a
/// decimal amount.
///
/// Fails with [`ConvertError::DivideByZero`] when the right operand of a
/// division is exactly zero, [`ConvertError::UnknownToken`] for any character
/// outside the grammar (a trailing `a` in `1*2a` is rejected, not silently
/// truncated), and [`ConvertError::InvalidExpression`] for anything else
/// malformed.
pub fn evaluate(expression: &str, format: &NumberFormat) -> ConvertResult<Decimal> {
    let separator = format.decimal_separator.as_str();

    let mut values: Vec<Decimal> = Vec::new();
    let mut ops: Vec<char> = Vec::new();

    let mut i = 0;
    while i < expression.len() {
        let rest = &expression[i..];
        let c = rest.chars().next().ok_or(ConvertError::InvalidExpression)?;

        if c.is_whitespace() {
            i += c.len_utf8();
        } else if c.is_ascii_digit() {
            // Digit run: digits, the decimal separator, embedded whitespace.
            let mut number = String::new();
            while i < expression.len() {
                let rest = &expression[i..];
                let c = rest.chars().next().ok_or(ConvertError::InvalidExpression)?;
                if c.is_ascii_digit() {
                    number.push(c);
                    i += 1;
                } else if rest.starts_with(separator) {
                    number.push('.');
                    i += separator.len();
                } else if c.is_whitespace() {
                    i += c.len_utf8();
                } else {
                    break;
                }
            }
            let value: Decimal = number
                .parse()
                .map_err(|_| ConvertError::InvalidExpression)?;
            values.push(value);
        } else if c == '(' {
            ops.push(c);
            i += 1;
        } else if c == ')' {
            while ops.last().is_some_and(|&op| op != '(') {
                apply_top(&mut values, &mut ops)?;
            }
            if ops.pop() != Some('(') {
                return Err(ConvertError::InvalidExpression);
            }
            i += 1;
        } else if matches!(c, '+' | '-' | '*' | '/') {
            while ops
                .last()
                .is_some_and(|&top| top != '(' && precedence(top) >= precedence(c))
            {
                apply_top(&mut values, &mut ops)?;
            }
            ops.push(c);
            i += 1;
        } else {
            return Err(ConvertError::UnknownToken(c));
        }
    }

    while !ops.is_empty() {
        if ops.last() == Some(&'(') {
            return Err(ConvertError::InvalidExpression);
        }
        apply_top(&mut values, &mut ops)?;
    }

    let result = values.pop().ok_or(ConvertError::InvalidExpression)?;
    if !values.is_empty() {
        return Err(ConvertError::InvalidExpression);
    }
    Ok(result)
}
