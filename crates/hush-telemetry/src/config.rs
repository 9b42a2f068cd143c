//! Telemetry configuration from environment variables.

use std::env;

use crate::TelemetryError;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to log lines
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `hs_04_peer_propagation=debug`
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "hush".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HUSH_SERVICE_NAME`: Service name (default: hush)
    /// - `HUSH_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `HUSH_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("HUSH_SERVICE_NAME").unwrap_or_else(|_| "hush".to_string()),

            log_level: env::var("HUSH_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("HUSH_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Configuration for a named node, e.g. one participant in a simulation.
    pub fn for_node(name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("hush-{}", name);
        config
    }

    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.service_name.is_empty() {
            return Err(TelemetryError::Config("service name is empty".into()));
        }
        if self.log_level.trim().is_empty() {
            return Err(TelemetryError::Config("log level is empty".into()));
        }
        Ok(())
    }
}
