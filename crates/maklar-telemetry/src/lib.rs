//! # Maklar Telemetry
//!
//! Structured logging and Prometheus metrics for Maklar services.
//!
//! - [`init_logging`] installs a `tracing-subscriber` registry (JSON or
//!   pretty output, `EnvFilter` directives).
//! - [`init_metrics`] installs the Prometheus recorder and describes the
//!   validation counters.
//!
//! ```rust,ignore
//! use maklar_telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::development())?;
//! ```

#![doc(html_root_url = "https://docs.rs/maklar-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};
pub use metrics::{describe_metrics, init_metrics, names, render_metrics, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Logging and metrics settings together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Logging configuration.
    pub logging: LogConfig,
    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl TelemetryConfig {
    /// Pretty debug logging, metrics enabled.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            metrics: MetricsConfig::default(),
        }
    }

    /// JSON info logging, metrics enabled.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Initializes logging first, then metrics.
///
/// # Errors
///
/// Returns the first subsystem error.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    tracing::info!(
        log_format = %config.logging.format,
        metrics = config.metrics.enabled,
        "telemetry initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_in_logging_only() {
        let dev = TelemetryConfig::development();
        let prod = TelemetryConfig::production();
        assert_eq!(dev.metrics, prod.metrics);
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert_eq!(prod.logging.format, LogFormat::Json);
    }
}
