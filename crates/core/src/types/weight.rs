//! Defensive parsing of display strings that carry a numeric magnitude.
//!
//! Weights are stored the way the shop types them ("10g", "12.5 grams",
//! "approx 8g"). Everything that is not an ASCII digit or a decimal point is
//! stripped, then the longest leading `digits[.digits]` run is read. Input that
//! yields no digits parses to `None`; callers decide whether that means "ignore"
//! (range filtering) or zero (sorting, pricing). Magnitudes beyond what
//! `Decimal` can hold saturate to `Decimal::MAX`.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parse the numeric magnitude out of a weight string.
///
/// ```rust
/// # use gilded_core::parse_weight;
/// # use rust_decimal::Decimal;
/// assert_eq!(parse_weight("10g"), Some(Decimal::from(10)));
/// assert_eq!(parse_weight("abc"), None);
/// ```
#[must_use]
pub fn parse_weight(raw: &str) -> Option<Decimal> {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    for (idx, c) in stripped.char_indices() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        end = idx + c.len_utf8();
    }

    let number = stripped.get(..end)?.trim_end_matches('.');
    if !number.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    // ".5" is a valid float literal but not a valid Decimal literal
    let parsed = if number.starts_with('.') {
        Decimal::from_str(&format!("0{number}"))
    } else {
        Decimal::from_str(number)
    };
    // only digits and one point remain, so a failure is an overflow
    Some(parsed.unwrap_or(Decimal::MAX))
}
