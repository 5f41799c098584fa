//! Placeholder substitution with locale-aware value formatting.

use chrono::NaiveDate;
use maklar_core::{ParamValue, Params};
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("valid regex"))
}

/// Words used when rendering booleans.
#[derive(Debug, Clone, Copy)]
pub(crate) struct YesNo<'a> {
    pub yes: &'a str,
    pub no: &'a str,
}

/// Replaces every `{name}` with the formatted parameter. Placeholders with
/// no matching parameter are left as they are.
pub(crate) fn substitute(template: &str, params: &Params, locale: &str, words: YesNo<'_>) -> String {
    if params.is_empty() {
        return template.to_string();
    }
    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| match params.get(&caps[1]) {
            Some(value) => format_value(value, locale, words),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn format_value(value: &ParamValue, locale: &str, words: YesNo<'_>) -> String {
    match value {
        ParamValue::Bool(true) => words.yes.to_string(),
        ParamValue::Bool(false) => words.no.to_string(),
        ParamValue::Integer(n) => format_integer(*n, locale),
        ParamValue::Number(n) => format_number(*n, locale),
        ParamValue::Date(date) => format_date(*date, locale),
        ParamValue::Text(text) => text.clone(),
        ParamValue::List(items) => items.join(", "),
    }
}

/// `(group separator, decimal separator)` for a locale's language.
fn separators(locale: &str) -> (Option<char>, char) {
    match language(locale) {
        "sv" => (Some('\u{a0}'), ','),
        "en" => (Some(','), '.'),
        _ => (None, '.'),
    }
}

fn language(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}

fn group_digits(digits: &str, separator: Option<char>) -> String {
    let Some(separator) = separator else {
        return digits.to_string();
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Formats a whole number with the locale's digit grouping.
pub(crate) fn format_integer(value: i64, locale: &str) -> String {
    let (group, _) = separators(locale);
    let digits = group_digits(&value.unsigned_abs().to_string(), group);
    if value < 0 {
        format!("-{digits}")
    } else {
        digits
    }
}

/// Formats a decimal number with at most three fraction digits.
pub(crate) fn format_number(value: f64, locale: &str) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let (group, decimal) = separators(locale);
    let rendered = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 && (int_part.bytes().any(|b| b != b'0') || !frac.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, group));
    if !frac.is_empty() {
        out.push(decimal);
        out.push_str(frac);
    }
    out
}

/// Formats a date in the locale's short numeric form.
pub(crate) fn format_date(value: NaiveDate, locale: &str) -> String {
    match language(locale) {
        "en" => value.format("%-m/%-d/%Y").to_string(),
        _ => value.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SV: YesNo<'static> = YesNo {
        yes: "ja",
        no: "nej",
    };

    fn params(entries: &[(&str, ParamValue)]) -> Params {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_substitutes_known_and_keeps_unknown() {
        let p = params(&[("field", "Boarea".into()), ("min", ParamValue::Integer(10))]);
        assert_eq!(
            substitute("{field} måste vara minst {min} {unit}", &p, "sv", SV),
            "Boarea måste vara minst 10 {unit}"
        );
    }

    #[test]
    fn test_swedish_number_formatting() {
        assert_eq!(format_integer(1_000_000, "sv"), "1\u{a0}000\u{a0}000");
        assert_eq!(format_integer(-1234, "sv"), "-1\u{a0}234");
        assert_eq!(format_integer(999, "sv"), "999");
        assert_eq!(format_number(0.5, "sv"), "0,5");
        assert_eq!(format_number(1234.5, "sv-SE"), "1\u{a0}234,5");
        assert_eq!(format_number(2.0, "sv"), "2");
    }

    #[test]
    fn test_english_and_unknown_locale_formatting() {
        assert_eq!(format_integer(1_500_000, "en"), "1,500,000");
        assert_eq!(format_number(0.125, "en-GB"), "0.125");
        assert_eq!(format_integer(1_500_000, "de"), "1500000");
    }

    #[test]
    fn test_dates_and_booleans() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date(date, "sv"), "2024-03-05");
        assert_eq!(format_date(date, "en"), "3/5/2024");

        let p = params(&[("hiss", ParamValue::Bool(true)), ("pool", ParamValue::Bool(false))]);
        assert_eq!(substitute("{hiss}/{pool}", &p, "sv", SV), "ja/nej");
    }

    #[test]
    fn test_lists_are_comma_separated() {
        let p = params(&[("keys", ParamValue::List(vec!["a".into(), "b".into()]))]);
        assert_eq!(substitute("Okända fält: {keys}", &p, "sv", SV), "Okända fält: a, b");
    }
}
