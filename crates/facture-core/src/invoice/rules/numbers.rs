//! Number parsing and formatting for French invoice tokens.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::DECIMAL_NUMERAL;

/// Fraction digits of unit price and amount fields.
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// A numeric row token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Numeral within `Decimal` range, formatted exactly.
    Exact(Decimal),
    /// Valid numeral too large for `Decimal`, kept as a float.
    Wide(f64),
}

impl Number {
    /// Price or amount rendering with exactly two fraction digits.
    pub fn format_amount(self) -> String {
        match self {
            Number::Exact(value) => format_amount(value),
            Number::Wide(value) => format!("{:.*}", AMOUNT_DECIMAL_PLACES as usize, value),
        }
    }

    /// Quantity rendering: integers without a fraction.
    pub fn format_quantity(self) -> String {
        match self {
            Number::Exact(value) => format_quantity(value),
            Number::Wide(value) if value.fract() == 0.0 => format!("{:.0}", value),
            Number::Wide(value) => value.to_string(),
        }
    }

    pub fn to_f64(self) -> Option<f64> {
        match self {
            Number::Exact(value) => value.to_string().parse().ok(),
            Number::Wide(value) => Some(value),
        }
    }
}

/// Parse a French-formatted number (e.g. "1 234,56" or "12.5").
///
/// Spaces (including no-break and narrow no-break spaces) are removed and
/// commas become decimal points. Any plain decimal numeral left afterwards
/// is a number, whatever its magnitude; everything else is `None`.
pub fn parse_number(token: &str) -> Option<Number> {
    let cleaned: String = token
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{00a0}' | '\u{202f}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let caps = DECIMAL_NUMERAL.captures(cleaned.trim())?;
    let sign = caps.get(1).map_or("", |m| m.as_str());
    let integer_part = caps.get(2).map_or("", |m| m.as_str());
    let fraction_part = caps.get(3).map_or("", |m| m.as_str());

    if integer_part.is_empty() && fraction_part.is_empty() {
        return None;
    }

    let sign = if sign == "-" { "-" } else { "" };
    let integer_part = if integer_part.is_empty() { "0" } else { integer_part };

    let numeral = if fraction_part.is_empty() {
        format!("{}{}", sign, integer_part)
    } else {
        format!("{}{}.{}", sign, integer_part, fraction_part)
    };

    match Decimal::from_str(&numeral) {
        Ok(value) => Some(Number::Exact(value)),
        Err(_) => numeral.parse::<f64>().ok().map(Number::Wide),
    }
}

/// Format a price or amount with exactly two fraction digits ("25.50").
///
/// Values that round to zero render as "0.00", without a sign.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(
        AMOUNT_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    );
    rounded.rescale(AMOUNT_DECIMAL_PLACES);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

/// Format a quantity: whole numbers without fraction ("3"), others in
/// their shortest decimal form ("2.5").
pub fn format_quantity(value: Decimal) -> String {
    let mut value = value.normalize();
    if value.is_zero() {
        value.set_sign_positive(true);
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn num(s: &str) -> Option<Number> {
        Some(Number::Exact(dec(s)))
    }

    #[test]
    fn test_parse_french_numbers() {
        assert_eq!(parse_number("1 234,56"), num("1234.56"));
        assert_eq!(parse_number("12.5"), num("12.5"));
        assert_eq!(parse_number("10,00"), num("10.00"));
        assert_eq!(parse_number("3"), num("3"));
        assert_eq!(parse_number("1\u{202f}000,5"), num("1000.5"));
        assert_eq!(parse_number("1\u{00a0}000"), num("1000"));
    }

    #[test]
    fn test_parse_signs_and_partial_numerals() {
        assert_eq!(parse_number("-4,20"), num("-4.20"));
        assert_eq!(parse_number("+7"), num("7"));
        assert_eq!(parse_number(",5"), num("0.5"));
        assert_eq!(parse_number("5."), num("5"));
    }

    #[test]
    fn test_parse_rejects_non_numbers() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("1,234.56"), None);
        assert_eq!(parse_number("12€"), None);
        assert_eq!(parse_number("1e5"), None);
        assert_eq!(parse_number("N°12"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("10")), "10.00");
        assert_eq!(format_amount(dec("25.5")), "25.50");
        assert_eq!(format_amount(dec("1234.56")), "1234.56");
        assert_eq!(format_amount(dec("2.675")), "2.68");
        assert_eq!(format_amount(dec("0.004")), "0.00");
        assert_eq!(format_amount(dec("-0.001")), "0.00");
        assert_eq!(format_amount(dec("-4.2")), "-4.20");
    }

    #[test]
    fn test_numerals_beyond_decimal_range() {
        let long = "1234567890123456789012345678901234";
        let Some(Number::Wide(value)) = parse_number(long) else {
            panic!("{long} should parse as a wide number");
        };
        assert_eq!(value, 1234567890123456789012345678901234.0);

        let quantity = Number::Wide(value).format_quantity();
        assert_eq!(quantity.len(), long.len());
        assert!(!quantity.contains('.'));

        let amount = Number::Wide(value).format_amount();
        assert!(amount.ends_with(".00"));
        assert_eq!(amount.len(), long.len() + 3);

        assert!(matches!(
            parse_number("-99999999999999999999999999999999,5"),
            Some(Number::Wide(v)) if v < 0.0
        ));
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(dec("3")), "3");
        assert_eq!(format_quantity(dec("3.0")), "3");
        assert_eq!(format_quantity(dec("2.50")), "2.5");
        assert_eq!(format_quantity(dec("0.125")), "0.125");
        assert_eq!(format_quantity(dec("-0.0")), "0");
    }
}
