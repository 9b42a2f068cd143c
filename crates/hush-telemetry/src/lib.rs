//! # Hush Telemetry
//!
//! Observability for Hush nodes.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, either as
//!   human-readable lines or as JSON for log shippers.
//! - **Metrics**: Prometheus counters and gauges for the envelope pool, watch
//!   notifications, peer links and transaction sender recovery.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hush_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HUSH_SERVICE_NAME` | `hush` | Service name attached to log lines |
//! | `HUSH_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `HUSH_JSON_LOGS` | `false` | Emit JSON instead of pretty lines |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, ENVELOPES_ACCEPTED, ENVELOPES_REJECTED,
    ENVELOPES_RELAYED, PEERS_CONNECTED, POOL_SIZE, SENDER_RECOVERY_FAILURES, WATCHES_NOTIFIED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize log subscriber: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json = config.json_logs,
        "telemetry initialized"
    );

    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_name() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "hush");
    }

    #[test]
    fn test_metric_inc_macro() {
        let before = ENVELOPES_REJECTED.with_label_values(&["duplicate"]).get();
        metric_inc!(ENVELOPES_REJECTED, &["duplicate"]);
        assert!(ENVELOPES_REJECTED.with_label_values(&["duplicate"]).get() > before);
    }
}
