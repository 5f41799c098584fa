//! Mod-10 checksum used by personal IDs and organization numbers.

/// Computes the check digit for the given body digits.
///
/// Digits at even positions (0-based) are doubled, 9 is subtracted from any
/// product above 9, and the check digit is `(10 - sum % 10) % 10`.
///
/// Returns `None` if `body` contains a non-digit.
///
/// ```
/// use maklar_validators::checksum::check_digit;
///
/// assert_eq!(check_digit("811218987"), Some(6));
/// assert_eq!(check_digit("55655-0"), None);
/// ```
#[must_use]
pub fn check_digit(body: &str) -> Option<u32> {
    let mut sum = 0;
    for (position, c) in body.chars().enumerate() {
        let digit = c.to_digit(10)?;
        let weighted = if position % 2 == 0 { digit * 2 } else { digit };
        sum += if weighted > 9 { weighted - 9 } else { weighted };
    }
    Some((10 - sum % 10) % 10)
}

/// Returns `true` if the last digit of a 10-digit string is the check digit of
/// the first nine.
#[must_use]
pub fn verify(digits: &str) -> bool {
    if digits.len() != 10 || !crate::is_ascii_digits(digits) {
        return false;
    }
    let (body, check) = digits.split_at(9);
    match (check_digit(body), check.chars().next().and_then(|c| c.to_digit(10))) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => false,
    }
}
