//! Top-level configuration and validation.

use crate::error::ConfigError;
use crate::schema::{HttpConfig, MessagesConfig, ValidationConfig};
use maklar_forms::ValidationMode;
use maklar_schema::{RefinementPolicy, SchemaError};
use maklar_telemetry::{LogConfig, MetricsConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Complete Maklar configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables over these defaults.
///
/// # Example
///
/// ```
/// use maklar_config::MaklarConfig;
///
/// let config = MaklarConfig::default();
/// assert_eq!(config.messages.default_locale, "sv");
/// assert_eq!(config.policy.price_ratio.max, 1.5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct MaklarConfig {
    /// Form and middleware validation behavior.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Catalogs, locales and message caching.
    #[serde(default)]
    pub messages: MessagesConfig,

    /// Cross-field rule constants.
    #[serde(default)]
    pub policy: RefinementPolicy,

    /// Request middleware.
    #[serde(default)]
    pub http: HttpConfig,

    /// Structured logging.
    #[serde(default)]
    pub logging: LogConfig,

    /// Prometheus metrics.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl MaklarConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> MaklarConfigBuilder {
        MaklarConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field:
    /// - the default locale is empty or not among the supported locales
    /// - the cache has entries but no TTL, or a TTL but no entries
    /// - the refinement policy is inconsistent (ratio bounds, tolerance,
    ///   bounding box, energy bands)
    /// - the log filter or metrics address does not parse
    pub fn validate(&self) -> Result<(), ConfigError> {
        let messages = &self.messages;
        if messages.default_locale.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "messages.default_locale",
                "must not be empty",
            ));
        }
        if !messages.supported_locales.contains(&messages.default_locale) {
            return Err(ConfigError::invalid_value(
                "messages.default_locale",
                format!(
                    "'{}' is not in supported_locales {:?}",
                    messages.default_locale, messages.supported_locales
                ),
            ));
        }

        let cache = &messages.cache;
        if !cache.is_disabled() && (cache.max_entries == 0 || cache.ttl_secs == 0) {
            return Err(ConfigError::invalid_value(
                "messages.cache",
                "max_entries and ttl_secs must both be zero (disabled) or both positive",
            ));
        }

        self.policy.validate().map_err(|err| match err {
            SchemaError::InvalidPolicy { field, message } => {
                ConfigError::invalid_value(format!("policy.{field}"), message)
            }
            other => ConfigError::validation_error(other.to_string()),
        })?;

        if self.logging.enabled {
            maklar_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        if let Some(addr) = self.metrics.listen_addr.as_deref() {
            if self.metrics.enabled && addr.parse::<SocketAddr>().is_err() {
                return Err(ConfigError::invalid_value(
                    "metrics.listen_addr",
                    format!("invalid socket address: {addr}"),
                ));
            }
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logging, internal error detail in 500 responses,
    /// violation params attached to errors and a short message cache TTL.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging = LogConfig::development();
        config.http.expose_internal_errors = true;
        config.validation.include_params = true;
        config.messages.cache.max_entries = 500;
        config.messages.cache.ttl_secs = 60;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logging, no internal error detail, incoming request ids trusted
    /// from the edge proxy and a larger message cache.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging = LogConfig::production();
        config.http.expose_internal_errors = false;
        config.http.trust_request_id = true;
        config.validation.form_mode = ValidationMode::OnBlur;
        config.messages.cache.max_entries = 10_000;
        config.messages.cache.ttl_secs = 3600;

        config
    }
}

/// Builder for [`MaklarConfig`].
#[derive(Debug, Default)]
pub struct MaklarConfigBuilder {
    validation: Option<ValidationConfig>,
    messages: Option<MessagesConfig>,
    policy: Option<RefinementPolicy>,
    http: Option<HttpConfig>,
    logging: Option<LogConfig>,
    metrics: Option<MetricsConfig>,
}

impl MaklarConfigBuilder {
    /// Creates a builder where every section defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the validation section.
    #[must_use]
    pub fn validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Sets the messages section.
    #[must_use]
    pub fn messages(mut self, messages: MessagesConfig) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Sets the refinement policy.
    #[must_use]
    pub fn policy(mut self, policy: RefinementPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the HTTP section.
    #[must_use]
    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LogConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Sets the metrics section.
    #[must_use]
    pub fn metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Builds the configuration without validating it.
    #[must_use]
    pub fn build(self) -> MaklarConfig {
        MaklarConfig {
            validation: self.validation.unwrap_or_default(),
            messages: self.messages.unwrap_or_default(),
            policy: self.policy.unwrap_or_default(),
            http: self.http.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
        }
    }
}
