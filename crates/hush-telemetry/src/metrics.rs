//! Prometheus metrics for Hush subsystems.
//!
//! All metrics follow the naming convention: `hush_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // MESSAGE POOL METRICS
    // =========================================================================

    /// Envelopes admitted into the pool
    pub static ref ENVELOPES_ACCEPTED: Counter = Counter::new(
        "hush_pool_envelopes_accepted_total",
        "Total envelopes admitted into the message pool"
    ).expect("metric creation failed");

    /// Envelopes refused by the pool, by reason
    pub static ref ENVELOPES_REJECTED: CounterVec = CounterVec::new(
        Opts::new("hush_pool_envelopes_rejected_total", "Envelopes refused by the message pool"),
        &["reason"]  // duplicate/expired/from_future/insufficient_work/pool_full
    ).expect("metric creation failed");

    /// Current pool occupancy
    pub static ref POOL_SIZE: Gauge = Gauge::new(
        "hush_pool_envelopes",
        "Number of envelopes currently held in the message pool"
    ).expect("metric creation failed");

    // =========================================================================
    // WATCH METRICS
    // =========================================================================

    /// Watch notifications delivered
    pub static ref WATCHES_NOTIFIED: Counter = Counter::new(
        "hush_watch_notifications_total",
        "Total envelope hashes appended to watch pending sets"
    ).expect("metric creation failed");

    // =========================================================================
    // PEER METRICS
    // =========================================================================

    /// Connected peers
    pub static ref PEERS_CONNECTED: Gauge = Gauge::new(
        "hush_peers_connected",
        "Number of currently connected peers"
    ).expect("metric creation failed");

    /// Envelopes sent to peers
    pub static ref ENVELOPES_RELAYED: Counter = Counter::new(
        "hush_peer_envelopes_relayed_total",
        "Total envelopes sent to peers"
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSACTION METRICS
    // =========================================================================

    /// Sender recovery failures
    pub static ref SENDER_RECOVERY_FAILURES: Counter = Counter::new(
        "hush_tx_sender_recovery_failures_total",
        "Transactions whose sender could not be recovered"
    ).expect("metric creation failed");
}

/// Handle for the metrics registry
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Pool
        Box::new(ENVELOPES_ACCEPTED.clone()),
        Box::new(ENVELOPES_REJECTED.clone()),
        Box::new(POOL_SIZE.clone()),
        // Watches
        Box::new(WATCHES_NOTIFIED.clone()),
        // Peers
        Box::new(PEERS_CONNECTED.clone()),
        Box::new(ENVELOPES_RELAYED.clone()),
        // Transactions
        Box::new(SENDER_RECOVERY_FAILURES.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_encode() {
        // A second registration in the same process fails; either way the
        // registry must still encode.
        let _ = register_metrics();
        PEERS_CONNECTED.set(3.0);
        let text = encode_metrics().unwrap();
        assert!(text.contains("hush_peers_connected"));
    }

    #[test]
    fn test_counter_increment() {
        ENVELOPES_ACCEPTED.inc();
        assert!(ENVELOPES_ACCEPTED.get() >= 1.0);
    }

    #[test]
    fn test_gauge_set() {
        POOL_SIZE.set(42.0);
        assert_eq!(POOL_SIZE.get(), 42.0);
    }
}
