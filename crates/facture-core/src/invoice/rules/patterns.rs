//! Common regex patterns for line-item tokens.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Plain decimal numeral after separator cleanup: optional sign, digits,
    // optional fractional part. No exponent, no grouping.
    pub static ref DECIMAL_NUMERAL: Regex = Regex::new(
        r"^([+-]?)([0-9]*)(?:\.([0-9]*))?$"
    ).unwrap();
}
