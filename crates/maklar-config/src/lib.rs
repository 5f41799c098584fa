//! Typed configuration for Maklar.
//!
//! - TOML and JSON configuration files, merged key by key over defaults
//! - Environment variable overrides
//! - Strict parsing (fails on unknown fields)
//! - Semantic validation before use
//!
//! # Overview
//!
//! [`MaklarConfig`] groups the settings of every Maklar component:
//!
//! - [`ValidationConfig`] - form validation timing, violation params
//! - [`MessagesConfig`] - locales, catalog directory, message cache
//! - [`RefinementPolicy`](maklar_schema::RefinementPolicy) - cross-field rule constants
//! - [`HttpConfig`] - request middleware behavior
//! - [`LogConfig`](maklar_telemetry::LogConfig) and
//!   [`MetricsConfig`](maklar_telemetry::MetricsConfig) - telemetry
//!
//! # Example
//!
//! ```no_run
//! use maklar_config::ConfigLoader;
//!
//! # fn main() -> Result<(), maklar_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("maklar.toml")?
//!     .with_env_prefix("MAKLAR")
//!     .load()?;
//!
//! println!("default locale: {}", config.messages.default_locale);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [validation]
//! form_mode = "on_blur"
//! include_params = false
//!
//! [messages]
//! default_locale = "sv"
//! supported_locales = ["sv", "en"]
//! catalog_dir = "/etc/maklar/catalogs"
//!
//! [messages.cache]
//! max_entries = 10000
//! ttl_secs = 3600
//!
//! [policy]
//! accepted_price_tolerance = 0.05
//!
//! [policy.price_ratio]
//! min = 0.5
//! max = 1.5
//!
//! [http]
//! expose_internal_errors = false
//! trust_request_id = true
//! sanitization = "moderate"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! listen_addr = "0.0.0.0:9090"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `MAKLAR__MESSAGES__DEFAULT_LOCALE=en`
//! - `MAKLAR__MESSAGES__SUPPORTED_LOCALES=sv,en`
//! - `MAKLAR__HTTP__EXPOSE_INTERNAL_ERRORS=true`
//! - `MAKLAR__POLICY__PRICE_RATIO__MAX=1.6`

#![doc(html_root_url = "https://docs.rs/maklar-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{MaklarConfig, MaklarConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{CacheConfig, HttpConfig, MessagesConfig, ValidationConfig};
