//! # Integration Scenarios
//!
//! Nodes here are full `HushHost`s linked by the in-memory transport, so
//! every packet crosses a real tokio task boundary.

pub mod forwarding;
pub mod transaction_flow;
pub mod whisper_topic;

use std::sync::Arc;
use std::time::Duration;

use hs_01_envelope::OpenError;
use hs_02_message_pool::PoolConfig;
use hs_03_watch_registry::WatchId;
use hs_04_peer_propagation::{HushApi, MemoryNode, PropagationConfig};
use hush_telemetry::TelemetryConfig;
use shared_types::SystemTimeSource;

/// How long a scenario waits for gossip to settle.
pub const SETTLE: Duration = Duration::from_secs(5);

/// Routes node logs through the test harness at the level named by
/// `HUSH_LOG_LEVEL` / `RUST_LOG` (default `warn`). Safe to call repeatedly.
pub fn init_test_logging() {
    let mut config = TelemetryConfig::for_node("test");
    if std::env::var_os("HUSH_LOG_LEVEL").is_none() && std::env::var_os("RUST_LOG").is_none() {
        config.log_level = "warn".to_string();
    }
    let filter = tracing_subscriber::EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn node_with(pool: PoolConfig, propagation: PropagationConfig) -> MemoryNode {
    MemoryNode::new(pool, propagation, Arc::new(SystemTimeSource))
}

/// Node with production admission rules.
pub fn node() -> MemoryNode {
    node_with(PoolConfig::default(), PropagationConfig::default())
}

/// Polls `done` until it holds or `timeout` passes.
pub async fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if done() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Drains `watch` on `node` until `expected` payloads were collected or the
/// settle time runs out, then keeps draining briefly to catch duplicates.
pub async fn collect_payloads(node: &MemoryNode, watch: WatchId, expected: usize) -> Vec<Vec<u8>> {
    let host = node.host();
    let mut payloads = Vec::new();
    let drain = |payloads: &mut Vec<Vec<u8>>| -> Result<(), OpenError> {
        let topics = host.full_topics(watch).unwrap_or_default();
        for hash in host.check_watch(watch).unwrap_or_default() {
            if let Ok(envelope) = host.envelope(&hash) {
                payloads.push(envelope.open(&topics, None)?.into_payload());
            }
        }
        Ok(())
    };

    let deadline = tokio::time::Instant::now() + SETTLE;
    while payloads.len() < expected && tokio::time::Instant::now() < deadline {
        drain(&mut payloads).expect("watched envelope should open");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    drain(&mut payloads).expect("watched envelope should open");
    payloads
}
