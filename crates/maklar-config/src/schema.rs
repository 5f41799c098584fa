//! Configuration sections.

use maklar_forms::ValidationMode;
use maklar_middleware::SanitizationProfile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Validation behavior shared by forms and request middleware.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// When form controllers validate individual fields.
    pub form_mode: ValidationMode,

    /// Attach violation parameters (limits, allowed values) to each
    /// reported error.
    pub include_params: bool,
}

/// Message catalogs and resolution.
///
/// # Example
///
/// ```
/// use maklar_config::MessagesConfig;
///
/// let config = MessagesConfig::default();
/// assert_eq!(config.default_locale, "sv");
/// assert!(config.catalog_dir.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MessagesConfig {
    /// Locale every lookup falls back to.
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Locales callers may request.
    #[serde(default = "default_supported_locales")]
    pub supported_locales: Vec<String>,

    /// Directory of `<locale>.json` / `<locale>.toml` catalogs. The embedded
    /// catalogs are used when unset.
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,

    /// Resolved-message cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            supported_locales: default_supported_locales(),
            catalog_dir: None,
            cache: CacheConfig::default(),
        }
    }
}

fn default_locale() -> String {
    "sv".to_string()
}

fn default_supported_locales() -> Vec<String> {
    vec!["sv".to_string(), "en".to_string()]
}

/// Resolved-message cache limits. Zero entries and zero TTL disables it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of cached messages.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Seconds a cached message stays valid.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    /// TTL as a [`Duration`].
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Returns `true` if caching is switched off.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.max_entries == 0 && self.ttl_secs == 0
    }
}

fn default_max_entries() -> usize {
    1_000
}

fn default_ttl_secs() -> u64 {
    3600
}

/// Request middleware settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Include internal error detail in 500 envelopes.
    ///
    /// **Warning**: Only enable this in development environments.
    pub expose_internal_errors: bool,

    /// Reuse a valid incoming `x-request-id` instead of generating one.
    pub trust_request_id: bool,

    /// Default sanitization profile for query, params and body.
    pub sanitization: SanitizationProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_defaults() {
        let config = MessagesConfig::default();
        assert_eq!(config.supported_locales, vec!["sv", "en"]);
        assert_eq!(config.cache.max_entries, 1_000);
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_cache_disabled() {
        assert!(!CacheConfig::default().is_disabled());
        let off = CacheConfig {
            max_entries: 0,
            ttl_secs: 0,
        };
        assert!(off.is_disabled());
    }

    #[test]
    fn test_http_defaults() {
        let config = HttpConfig::default();
        assert!(!config.expose_internal_errors);
        assert!(!config.trust_request_id);
        assert_eq!(config.sanitization, SanitizationProfile::Moderate);
    }

    #[test]
    fn test_sections_reject_unknown_fields() {
        assert!(toml::from_str::<HttpConfig>("expose_errors = true").is_err());
        assert!(toml::from_str::<CacheConfig>("size = 10").is_err());
    }

    #[test]
    fn test_validation_mode_names() {
        let config: ValidationConfig = toml::from_str(r#"form_mode = "on_blur""#).unwrap();
        assert_eq!(config.form_mode, ValidationMode::OnBlur);
        assert!(!config.include_params);
    }
}
