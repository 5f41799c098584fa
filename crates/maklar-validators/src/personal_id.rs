//! Swedish personal identity numbers (personnummer).
//!
//! Accepted shapes are `YYMMDDXXXX` and `YYYYMMDDXXXX` with optional `-`, `+`
//! or whitespace separators. The century prefix of the 12-digit form is
//! dropped before the checksum is computed.

use crate::{checksum, is_ascii_digits, strip};

fn is_separator(c: char) -> bool {
    c == '-' || c == '+' || c.is_whitespace()
}

/// Returns `true` if `input` is a personal ID with a matching check digit.
///
/// ```
/// use maklar_validators::personal_id;
///
/// assert!(personal_id::is_valid("811218-9876"));
/// assert!(personal_id::is_valid("19811218-9876"));
/// assert!(!personal_id::is_valid("811218-9875"));
/// ```
#[must_use]
pub fn is_valid(input: &str) -> bool {
    let digits = strip(input, is_separator);
    if !is_ascii_digits(&digits) {
        return false;
    }
    match digits.len() {
        10 => checksum::verify(&digits),
        12 => checksum::verify(&digits[2..]),
        _ => false,
    }
}

/// Renders `YYMMDD-XXXX` or `YYYYMMDD-XXXX`; any other shape is returned unchanged.
///
/// The check digit is not verified.
#[must_use]
pub fn format(input: &str) -> String {
    let digits = strip(input, is_separator);
    if !is_ascii_digits(&digits) {
        return input.to_string();
    }
    match digits.len() {
        10 => format!("{}-{}", &digits[..6], &digits[6..]),
        12 => format!("{}-{}", &digits[..8], &digits[8..]),
        _ => input.to_string(),
    }
}
