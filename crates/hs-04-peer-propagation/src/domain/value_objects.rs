//! Value objects for propagation configuration and status.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wire protocol version advertised in the status packet.
pub const PROTOCOL_VERSION: u32 = 2;

/// Peer propagation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Maximum envelopes per outbound messages packet
    pub max_batch: usize,
    /// Protocol version sent in the status packet
    pub protocol_version: u32,
    /// Queue every live pool envelope for a newly connected peer
    pub sync_on_connect: bool,
    /// Interval between pool housekeeping sweeps
    pub housekeeping_interval: Duration,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_batch: 64,
            protocol_version: PROTOCOL_VERSION,
            sync_on_connect: true,
            housekeeping_interval: Duration::from_secs(1),
        }
    }
}

/// Snapshot of a host for monitoring.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HostStatus {
    pub peers: usize,
    pub pooled_envelopes: usize,
    pub watches: usize,
    pub queued_envelopes: usize,
}
