//! Layered configuration loading.
//!
//! Layers are applied in order, later ones overriding earlier ones:
//! 1. Defaults or a preset
//! 2. Configuration files and strings (TOML or JSON), merged key by key
//! 3. Environment variables (`PREFIX__SECTION__KEY`)

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ConfigError, MaklarConfig};

/// Configuration loader with layered approach.
///
/// # Example
///
/// ```no_run
/// use maklar_config::ConfigLoader;
///
/// # fn main() -> Result<(), maklar_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_production()
///     .with_file("maklar.toml")?
///     .with_env_prefix("MAKLAR")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: MaklarConfig,
    env_prefix: Option<String>,
    files_loaded: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: MaklarConfig::default(),
            env_prefix: None,
            files_loaded: Vec::new(),
        }
    }

    /// Reset to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = MaklarConfig::default();
        self
    }

    /// Start from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = MaklarConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = MaklarConfig::production();
        self
    }

    /// Merge a configuration file, picking the format from its extension.
    ///
    /// Keys present in the file replace the current values; everything else
    /// is kept.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension, fails to parse, or names an unknown field.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let layer = Self::parse_file(&content, path)?;
        self.merge_layer(layer)?;
        self.files_loaded.push(path.to_path_buf());
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Merge configuration from a string in `"toml"` or `"json"` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on an unsupported format, a parse failure or
    /// an unknown field.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };

        self.merge_layer(layer)?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// With prefix `"MAKLAR"`:
    /// - `MAKLAR__MESSAGES__DEFAULT_LOCALE=en`
    /// - `MAKLAR__MESSAGES__CACHE__TTL_SECS=60`
    /// - `MAKLAR__HTTP__SANITIZATION=strict`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into().to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    ///
    /// # Errors
    ///
    /// Currently infallible; a missing or malformed `.env` is ignored.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Ok(self)
    }

    /// Files merged so far, in order.
    #[must_use]
    pub fn files_loaded(&self) -> &[PathBuf] {
        &self.files_loaded
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable does not parse or
    /// the final configuration is invalid.
    pub fn load(mut self) -> Result<MaklarConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration as layered so far, without environment
    /// overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> MaklarConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<Value, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn merge_layer(&mut self, layer: Value) -> Result<(), ConfigError> {
        if !layer.is_object() {
            return Err(ConfigError::validation_error(
                "configuration root must be a table",
            ));
        }
        let mut merged = serde_json::to_value(&self.config)?;
        merge_values(&mut merged, layer);
        self.config = serde_json::from_value(merged)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let env_vars: BTreeMap<String, String> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["VALIDATION", "FORM_MODE"] => {
                config.validation.form_mode = parse_enum(value).ok_or_else(|| {
                    ConfigError::env_parse_error(key, "expected on_change, on_blur, on_submit or all")
                })?;
            }
            ["VALIDATION", "INCLUDE_PARAMS"] => {
                config.validation.include_params = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            ["MESSAGES", "DEFAULT_LOCALE"] => {
                config.messages.default_locale = value.trim().to_string();
            }
            ["MESSAGES", "SUPPORTED_LOCALES"] => {
                config.messages.supported_locales = value
                    .split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            ["MESSAGES", "CATALOG_DIR"] => {
                config.messages.catalog_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            ["MESSAGES", "CACHE", "MAX_ENTRIES"] => {
                config.messages.cache.max_entries = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["MESSAGES", "CACHE", "TTL_SECS"] => {
                config.messages.cache.ttl_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }

            ["POLICY", "PRICE_RATIO", "MIN"] => {
                config.policy.price_ratio.min = parse_number(key, value)?;
            }
            ["POLICY", "PRICE_RATIO", "MAX"] => {
                config.policy.price_ratio.max = parse_number(key, value)?;
            }
            ["POLICY", "ACCEPTED_PRICE_TOLERANCE"] => {
                config.policy.accepted_price_tolerance = parse_number(key, value)?;
            }

            ["HTTP", "EXPOSE_INTERNAL_ERRORS"] => {
                config.http.expose_internal_errors = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["HTTP", "TRUST_REQUEST_ID"] => {
                config.http.trust_request_id = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["HTTP", "SANITIZATION"] => {
                config.http.sanitization = parse_enum(value).ok_or_else(|| {
                    ConfigError::env_parse_error(key, "expected strict, moderate or minimal")
                })?;
            }

            ["LOGGING", "ENABLED"] => {
                config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                config.logging.format = parse_enum(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected json or pretty"))?;
            }

            ["METRICS", "ENABLED"] => {
                config.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["METRICS", "LISTEN_ADDR"] => {
                config.metrics.listen_addr = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }

            _ => {}
        }

        Ok(())
    }
}

/// Recursively overlays `layer` onto `base`. Tables merge; other values
/// replace.
fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ConfigError::env_parse_error(key, "expected number"))
}

/// Parse a unit enum by its serde name.
fn parse_enum<T: DeserializeOwned>(value: &str) -> Option<T> {
    serde_json::from_value(Value::String(value.trim().to_lowercase())).ok()
}
