//! Swedish phone numbers.
//!
//! Two shapes are accepted once spaces, hyphens and parentheses are removed:
//! international `+46` followed by exactly nine digits, or domestic `0`
//! followed by eight or nine digits.

use crate::{is_ascii_digits, strip};

const COUNTRY_PREFIX: &str = "+46";

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '(' | ')')
}

/// Returns `true` if `input` is a Swedish phone number.
///
/// ```
/// use maklar_validators::phone_number;
///
/// assert!(phone_number::is_valid("+46 70 123 45 67"));
/// assert!(phone_number::is_valid("070-123 45 67"));
/// assert!(phone_number::is_valid("08-123 45 67"));
/// assert!(!phone_number::is_valid("+46 70 123 45"));
/// ```
#[must_use]
pub fn is_valid(input: &str) -> bool {
    let cleaned = strip(input, is_separator);
    if let Some(rest) = cleaned.strip_prefix(COUNTRY_PREFIX) {
        return rest.len() == 9 && is_ascii_digits(rest);
    }
    match cleaned.strip_prefix('0') {
        Some(rest) => (8..=9).contains(&rest.len()) && is_ascii_digits(rest),
        None => false,
    }
}

/// Renders `+46 XX XXX XX XX`, `0XX-XXX XX XX` or `0X-XXX XX XX`; any other
/// shape is returned unchanged.
#[must_use]
pub fn format(input: &str) -> String {
    let cleaned = strip(input, is_separator);
    if let Some(rest) = cleaned.strip_prefix(COUNTRY_PREFIX) {
        if rest.len() == 9 && is_ascii_digits(rest) {
            return format!(
                "{COUNTRY_PREFIX} {} {} {} {}",
                &rest[..2],
                &rest[2..5],
                &rest[5..7],
                &rest[7..]
            );
        }
        return input.to_string();
    }
    if cleaned.starts_with('0') && is_ascii_digits(&cleaned) {
        let area_len = match cleaned.len() {
            10 => 3,
            9 => 2,
            _ => return input.to_string(),
        };
        let (area, subscriber) = cleaned.split_at(area_len);
        return format!(
            "{area}-{} {} {}",
            &subscriber[..3],
            &subscriber[3..5],
            &subscriber[5..]
        );
    }
    input.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_international() {
        assert!(is_valid("+46701234567"));
        assert!(!is_valid("+4670123456"));
        assert!(!is_valid("+467012345678"));
        assert!(!is_valid("+4670123456a"));
    }

    #[test]
    fn test_domestic() {
        assert!(is_valid("0701234567"));
        assert!(is_valid("081234567"));
        assert!(is_valid("(08) 123 45 67"));
        assert!(!is_valid("08123456"));
        assert!(!is_valid("07012345678"));
        assert!(!is_valid("701234567"));
    }

    #[test]
    fn test_format() {
        assert_eq!(format("+46701234567"), "+46 70 123 45 67");
        assert_eq!(format("0701234567"), "070-123 45 67");
        assert_eq!(format("081234567"), "08-123 45 67");
        assert_eq!(format("12345"), "12345");
        assert_eq!(format("+46 12"), "+46 12");
    }
}
