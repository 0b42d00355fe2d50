//! Token rules for line-item rows.

pub mod designation;
pub mod numbers;
pub mod patterns;

pub use designation::DesignationFilter;
pub use numbers::{format_amount, format_quantity, parse_number, Number, AMOUNT_DECIMAL_PLACES};

/// How a single row token is used.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// A numeric value.
    Number(Number),
    /// Designation text.
    Text(&'a str),
    /// Neither a number nor usable text.
    Dropped,
}

/// Route a token: numbers first, then designation text, otherwise dropped.
pub fn route_token<'a>(token: &'a str, filter: &DesignationFilter) -> Token<'a> {
    if let Some(value) = parse_number(token) {
        Token::Number(value)
    } else if filter.is_valid(token) {
        Token::Text(token)
    } else {
        Token::Dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_route_token() {
        let filter = DesignationFilter::default();
        assert_eq!(
            route_token("5,00", &filter),
            Token::Number(Number::Exact(Decimal::from_str("5.00").unwrap()))
        );
        assert_eq!(route_token("Widget", &filter), Token::Text("Widget"));
        assert_eq!(route_token("TVA", &filter), Token::Dropped);
        assert_eq!(route_token("", &filter), Token::Dropped);
    }
}
