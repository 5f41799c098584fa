//! String sanitization for query, route-parameter and body values.
//!
//! Every profile strips `<script>` and `<style>` blocks, inline event
//! handler attributes and `javascript:` URLs. `strict` additionally
//! HTML-encodes what remains. Headers are never sanitized.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// How aggressively string input is cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanitizationProfile {
    /// Strip dangerous markup and HTML-encode the rest.
    Strict,
    /// Strip dangerous markup.
    #[default]
    Moderate,
    /// Same removals as `Moderate`; a separate setting for rich-text routes.
    Minimal,
}

impl SanitizationProfile {
    /// Profile name as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Moderate => "moderate",
            Self::Minimal => "minimal",
        }
    }

    const fn encodes_html(self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl std::fmt::Display for SanitizationProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn dangerous_patterns() -> &'static [Regex; 4] {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid regex"),
            Regex::new(r"(?is)<style\b.*?</style\s*>").expect("valid regex"),
            Regex::new(r#"(?i)\son\w+\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("valid regex"),
            Regex::new(r#"(?i)javascript:\s*[^"'\s]*"#).expect("valid regex"),
        ]
    })
}

/// Result of cleaning one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// The cleaned string.
    pub clean: String,
    /// Fragments that were removed.
    pub removed: Vec<String>,
}

impl Sanitized {
    /// Returns `true` if the output differs from the input.
    #[must_use]
    pub fn changed(&self, input: &str) -> bool {
        !self.removed.is_empty() || self.clean != input
    }
}

/// Cleans string input with a fixed profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer {
    profile: SanitizationProfile,
}

impl Sanitizer {
    /// Creates a sanitizer for `profile`.
    #[must_use]
    pub const fn new(profile: SanitizationProfile) -> Self {
        Self { profile }
    }

    /// The active profile.
    #[must_use]
    pub const fn profile(&self) -> SanitizationProfile {
        self.profile
    }

    /// Cleans one string.
    #[must_use]
    pub fn sanitize(&self, input: &str) -> Sanitized {
        let mut removed = Vec::new();
        let mut clean = input.to_string();
        for pattern in dangerous_patterns() {
            if pattern.is_match(&clean) {
                removed.extend(pattern.find_iter(&clean).map(|m| m.as_str().to_string()));
                clean = pattern.replace_all(&clean, "").into_owned();
            }
        }
        if self.profile.encodes_html() {
            clean = encode_html(&clean);
        }
        if !removed.is_empty() {
            tracing::warn!(
                profile = %self.profile,
                removed = removed.len(),
                "removed potentially dangerous content"
            );
        }
        Sanitized { clean, removed }
    }

    /// Cleans every string inside `value`, recursing into arrays and objects.
    pub fn sanitize_value(&self, value: &mut Value) {
        match value {
            Value::String(s) => {
                let cleaned = self.sanitize(s);
                *s = cleaned.clean;
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.sanitize_value(item)),
            Value::Object(map) => map.values_mut().for_each(|item| self.sanitize_value(item)),
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }
}

fn encode_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_removes_script_blocks() {
        let result = Sanitizer::default().sanitize("Villa <script>alert(1)</script>vid sjön");
        assert_eq!(result.clean, "Villa vid sjön");
        assert_eq!(result.removed, vec!["<script>alert(1)</script>"]);
        assert!(result.changed("Villa <script>alert(1)</script>vid sjön"));
    }

    #[test]
    fn test_removes_event_handlers_and_javascript_urls() {
        let sanitizer = Sanitizer::new(SanitizationProfile::Minimal);
        assert_eq!(
            sanitizer.sanitize(r#"<img src="x.png" onerror="steal()">"#).clean,
            r#"<img src="x.png">"#
        );
        assert_eq!(
            sanitizer.sanitize(r#"<a href="javascript:alert(1)">länk</a>"#).clean,
            r#"<a href="">länk</a>"#
        );
    }

    #[test]
    fn test_strict_encodes_html() {
        let result = Sanitizer::new(SanitizationProfile::Strict).sanitize("<b>Åre</b> & 'fjäll'");
        assert_eq!(result.clean, "&lt;b&gt;Åre&lt;&#x2F;b&gt; &amp; &#x27;fjäll&#x27;");
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let input = "Storgatan 1, 111 22 Stockholm";
        for profile in [
            SanitizationProfile::Moderate,
            SanitizationProfile::Minimal,
        ] {
            let result = Sanitizer::new(profile).sanitize(input);
            assert_eq!(result.clean, input);
            assert!(!result.changed(input));
        }
    }

    #[test]
    fn test_sanitize_value_recurses() {
        let mut value = json!({
            "beskrivning": "Fin<style>p{}</style> utsikt",
            "taggar": ["<script>x</script>sjö", 3],
            "adress": { "gata": "Storgatan javascript:void(0)" },
            "pris": 100
        });
        Sanitizer::default().sanitize_value(&mut value);
        assert_eq!(
            value,
            json!({
                "beskrivning": "Fin utsikt",
                "taggar": ["sjö", 3],
                "adress": { "gata": "Storgatan " },
                "pris": 100
            })
        );
    }

    #[test]
    fn test_profile_deserializes_lowercase() {
        let profile: SanitizationProfile = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(profile, SanitizationProfile::Strict);
        assert_eq!(SanitizationProfile::default().to_string(), "moderate");
    }
}
