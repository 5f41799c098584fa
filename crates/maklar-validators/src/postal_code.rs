//! Swedish postal codes.

use crate::{is_ascii_digits, strip};

/// Lowest postal code in use.
pub const MIN: u32 = 10_000;

/// Highest postal code in use.
pub const MAX: u32 = 99_999;

/// Returns `true` if `input` is five digits (whitespace ignored) within
/// [`MIN`]..=[`MAX`].
///
/// ```
/// use maklar_validators::postal_code;
///
/// assert!(postal_code::is_valid("11122"));
/// assert!(postal_code::is_valid("111 22"));
/// assert!(!postal_code::is_valid("09999"));
/// ```
#[must_use]
pub fn is_valid(input: &str) -> bool {
    let digits = strip(input, char::is_whitespace);
    if digits.len() != 5 || !is_ascii_digits(&digits) {
        return false;
    }
    digits
        .parse::<u32>()
        .map(|value| (MIN..=MAX).contains(&value))
        .unwrap_or(false)
}

/// Renders `XXX XX`; any other shape is returned unchanged.
#[must_use]
pub fn format(input: &str) -> String {
    let digits = strip(input, char::is_whitespace);
    if digits.len() == 5 && is_ascii_digits(&digits) {
        format!("{} {}", &digits[..3], &digits[3..])
    } else {
        input.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(is_valid("10000"));
        assert!(is_valid("99999"));
        assert!(!is_valid("09999"));
    }

    #[test]
    fn test_rejects_wrong_shapes() {
        assert!(!is_valid("1112"));
        assert!(!is_valid("111222"));
        assert!(!is_valid("111-22"));
        assert!(!is_valid("11a22"));
    }

    #[test]
    fn test_format() {
        assert_eq!(format("11122"), "111 22");
        assert_eq!(format(" 111 22 "), "111 22");
        assert_eq!(format("111-22"), "111-22");
    }
}
