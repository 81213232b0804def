//! Decimal amounts: parsing spreadsheet cells and formatting for documents.
//!
//! Cells arrive as display strings (`"$1,250.50"`, `"40"`, `"40 hrs"`). Parsing
//! strips currency symbols and group separators and then reads the longest
//! leading decimal number. All arithmetic downstream stays in `Decimal`.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("cell is empty")]
    Empty,

    #[error("cell is not numeric: {0:?}")]
    NotNumeric(String),

    #[error("cell value out of range: {0:?}")]
    OutOfRange(String),
}

/// Parse a currency- or number-formatted cell into a `Decimal`.
pub fn parse_amount(raw: &str) -> Result<Decimal, AmountParseError> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let mut chars = cleaned.chars().peekable();
    let mut sign = "";
    if let Some(&c) = chars.peek() {
        if c == '-' || c == '+' {
            if c == '-' {
                sign = "-";
            }
            chars.next();
        }
    }

    let mut int_digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        int_digits.push(c);
        chars.next();
    }

    let mut frac_digits = String::new();
    if chars.peek() == Some(&'.') {
        chars.next();
        while let Some(&c) = chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            frac_digits.push(c);
            chars.next();
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return Err(AmountParseError::NotNumeric(raw.to_string()));
    }

    let int_part = if int_digits.is_empty() { "0" } else { int_digits.as_str() };
    let normalized = if frac_digits.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_digits}")
    };

    Decimal::from_str(&normalized).map_err(|_| AmountParseError::OutOfRange(raw.to_string()))
}

/// Fixed two-decimal rendering, e.g. `40` -> `"40.00"`.
pub fn format_fixed(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Two-decimal rendering with a leading currency symbol, e.g. `"$4000.00"`.
pub fn format_currency(value: Decimal) -> String {
    if value.is_sign_negative() && !value.is_zero() {
        format!("-${}", format_fixed(value.abs()))
    } else {
        format!("${}", format_fixed(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn strips_currency_symbol_and_group_separators() {
        assert_eq!(parse_amount("$1,250.50").unwrap(), dec("1250.50"));
        assert_eq!(parse_amount(" $100 ").unwrap(), dec("100"));
        assert_eq!(parse_amount("12,345,678").unwrap(), dec("12345678"));
    }

    #[test]
    fn reads_leading_number_like_a_lenient_parser() {
        assert_eq!(parse_amount("40 hrs").unwrap(), dec("40"));
        assert_eq!(parse_amount(".5").unwrap(), dec("0.5"));
        assert_eq!(parse_amount("7.").unwrap(), dec("7"));
        assert_eq!(parse_amount("-12.25").unwrap(), dec("-12.25"));
        assert_eq!(parse_amount("1.2.3").unwrap(), dec("1.2"));
    }

    #[test]
    fn rejects_blank_and_non_numeric_cells() {
        assert_eq!(parse_amount("").unwrap_err(), AmountParseError::Empty);
        assert_eq!(parse_amount(" $ ").unwrap_err(), AmountParseError::Empty);
        assert!(matches!(parse_amount("n/a"), Err(AmountParseError::NotNumeric(_))));
        assert!(matches!(parse_amount("-"), Err(AmountParseError::NotNumeric(_))));
    }

    #[test]
    fn fixed_and_currency_formatting() {
        assert_eq!(format_fixed(dec("40")), "40.00");
        assert_eq!(format_fixed(dec("0.125")), "0.13");
        assert_eq!(format_currency(dec("4000")), "$4000.00");
        assert_eq!(format_currency(dec("-5")), "-$5.00");
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn decimal_summation_does_not_drift() {
        let total: Decimal =
            ["0.10", "0.10", "0.10"].iter().map(|s| parse_amount(s).unwrap()).sum();
        assert_eq!(total, dec("0.30"));
        assert_eq!(format_fixed(total), "0.30");
    }

    proptest! {
        #[test]
        fn cents_parse_exactly(cents in 0i64..10_000_000_000) {
            let expected = Decimal::new(cents, 2);
            let raw = format!("${}", expected);
            prop_assert_eq!(parse_amount(&raw).unwrap(), expected);
        }
    }
}
