//! Swedish organization numbers (organisationsnummer).

use crate::{checksum, is_ascii_digits, strip};

fn is_separator(c: char) -> bool {
    c == '-' || c == '+' || c.is_whitespace()
}

/// Returns `true` if `input` is a 10-digit organization number whose first
/// digit is 2-9 and whose check digit matches.
///
/// ```
/// use maklar_validators::organization_number;
///
/// assert!(organization_number::is_valid("556036-0793"));
/// assert!(!organization_number::is_valid("056036-0793"));
/// ```
#[must_use]
pub fn is_valid(input: &str) -> bool {
    let digits = strip(input, is_separator);
    if digits.len() != 10 || !is_ascii_digits(&digits) {
        return false;
    }
    if !matches!(digits.as_bytes()[0], b'2'..=b'9') {
        return false;
    }
    checksum::verify(&digits)
}

/// Renders `XXXXXX-XXXX`; any other shape is returned unchanged.
#[must_use]
pub fn format(input: &str) -> String {
    let digits = strip(input, is_separator);
    if digits.len() == 10 && is_ascii_digits(&digits) {
        format!("{}-{}", &digits[..6], &digits[6..])
    } else {
        input.to_string()
    }
}
