//! Swedish property designations (fastighetsbeteckning).
//!
//! Shape: `MUNICIPALITY TRACT BLOCK:UNIT[:SUBUNIT]`, e.g. `Stockholm Södermalm 1:23`.
//! Municipality and tract are words of letters; block, unit and subunit are
//! positive integers without leading zeros.

use regex::Regex;
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[A-Za-zÅÄÖåäöÉéÜü]+(?: [A-Za-zÅÄÖåäöÉéÜü]+)+ [1-9][0-9]*:[1-9][0-9]*(?::[1-9][0-9]*)?$",
        )
        .expect("valid regex")
    })
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `true` if `input` is a property designation.
///
/// ```
/// use maklar_validators::property_designation;
///
/// assert!(property_designation::is_valid("Stockholm Södermalm 1:23"));
/// assert!(!property_designation::is_valid("Stockholm 1:23"));
/// ```
#[must_use]
pub fn is_valid(input: &str) -> bool {
    pattern().is_match(&collapse_whitespace(input))
}

/// Trims and collapses internal whitespace.
#[must_use]
pub fn format(input: &str) -> String {
    collapse_whitespace(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subunit_levels() {
        assert!(is_valid("Stockholm Södermalm 1:23:4"));
        assert!(!is_valid("Stockholm Södermalm 1:2:3:4"));
    }

    #[test]
    fn test_multi_word_municipality() {
        assert!(is_valid("Upplands Väsby Runby 3:12"));
    }

    #[test]
    fn test_rejects_zero_and_leading_zero() {
        assert!(!is_valid("Stockholm Södermalm 0:23"));
        assert!(!is_valid("Stockholm Södermalm 01:23"));
    }

    #[test]
    fn test_rejects_decimals() {
        assert!(!is_valid("Stockholm Södermalm 1.5:23"));
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        assert!(is_valid("  Stockholm   Södermalm  1:23 "));
        assert_eq!(format("  Stockholm   Södermalm  1:23 "), "Stockholm Södermalm 1:23");
    }
}
