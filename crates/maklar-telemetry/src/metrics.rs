//! Prometheus metrics for Maklar.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `maklar_validation_failures_total` | Counter | `stage` | Requests rejected by the validation middleware |
//! | `maklar_message_cache_hits_total` | Counter | - | Resolved messages served from cache |
//! | `maklar_message_cache_misses_total` | Counter | - | Resolved messages built from a catalog |
//! | `maklar_catalog_loads_total` | Counter | `locale` | Locale catalogs loaded |
//!
//! The counters are recorded by the crates that own them; this module only
//! installs the exporter and describes them.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::OnceLock;

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metric names.
pub mod names {
    /// Requests rejected by the validation middleware.
    pub const VALIDATION_FAILURES: &str = "maklar_validation_failures_total";
    /// Message cache hits.
    pub const MESSAGE_CACHE_HITS: &str = "maklar_message_cache_hits_total";
    /// Message cache misses.
    pub const MESSAGE_CACHE_MISSES: &str = "maklar_message_cache_misses_total";
    /// Catalog loads.
    pub const CATALOG_LOADS: &str = "maklar_catalog_loads_total";

    /// All counter names.
    pub const ALL: [&str; 4] = [
        VALIDATION_FAILURES,
        MESSAGE_CACHE_HITS,
        MESSAGE_CACHE_MISSES,
        CATALOG_LOADS,
    ];
}

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Whether a recorder is installed.
    pub enabled: bool,

    /// Scrape endpoint address (e.g. `"0.0.0.0:9090"`).
    ///
    /// Without one, the recorder is installed and metrics are available
    /// through [`render_metrics`] for an existing HTTP route.
    pub listen_addr: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: None,
        }
    }
}

/// Installs the Prometheus recorder and describes the standard counters.
///
/// With a `listen_addr`, the exporter also serves `/metrics` itself; this
/// must then be called from within a Tokio runtime or it starts its own
/// background thread.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable address and
/// `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let builder = PrometheusBuilder::new();
    match &config.listen_addr {
        Some(addr) => {
            let addr: SocketAddr = addr
                .parse()
                .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;
            builder
                .with_http_listener(addr)
                .install()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        }
        None => {
            let handle = builder
                .install_recorder()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            let _ = METRICS_HANDLE.set(handle);
        }
    }

    describe_metrics();
    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` unless [`init_metrics`] installed a recorder without a
/// listen address.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for the standard counters.
pub fn describe_metrics() {
    describe_counter!(
        names::VALIDATION_FAILURES,
        "Requests rejected by the validation middleware, by input stage"
    );
    describe_counter!(
        names::MESSAGE_CACHE_HITS,
        "Resolved messages served from the message cache"
    );
    describe_counter!(
        names::MESSAGE_CACHE_MISSES,
        "Resolved messages built from a locale catalog"
    );
    describe_counter!(names::CATALOG_LOADS, "Locale catalogs loaded, by locale");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert!(config.listen_addr.is_none());
    }

    #[test]
    fn test_disabled_is_noop() {
        let config = MetricsConfig {
            enabled: false,
            listen_addr: Some("not an address".to_string()),
        };
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_invalid_address() {
        let config = MetricsConfig {
            enabled: true,
            listen_addr: Some("localhost".to_string()),
        };
        let err = init_metrics(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidAddress(_)));
        assert!(err.to_string().contains("localhost"));
    }

    #[test]
    fn test_describe_without_recorder() {
        describe_metrics();
        metrics::counter!(names::VALIDATION_FAILURES, "stage" => "body").increment(1);
    }

    #[test]
    fn test_names_share_prefix() {
        for name in names::ALL {
            assert!(name.starts_with("maklar_"));
            assert!(name.ends_with("_total"));
        }
    }

    #[test]
    fn test_deserialize_toml() {
        let config: MetricsConfig = toml::from_str(r#"listen_addr = "127.0.0.1:9090""#).unwrap();
        assert_eq!(config.listen_addr.as_deref(), Some("127.0.0.1:9090"));
        assert!(config.enabled);
    }
}
