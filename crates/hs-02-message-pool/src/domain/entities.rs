//! Pool configuration and admission outcomes.

use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Message pool configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum envelopes held at once.
    pub max_messages: usize,
    /// Minimum proof-of-work score (`2^bits × ttl / size`) for admission.
    pub min_pow: f64,
    /// How far in the future an envelope's send time may lie (seconds).
    pub max_clock_skew_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_messages: 10_000,
            min_pow: 2.0,
            max_clock_skew_secs: 30,
        }
    }
}

impl PoolConfig {
    /// Small pool that admits any amount of work.
    pub fn for_testing() -> Self {
        Self {
            max_messages: 100,
            min_pow: 0.0,
            max_clock_skew_secs: 30,
        }
    }
}

/// Why an envelope was refused.
#[derive(Clone, Debug, PartialEq)]
pub enum RejectReason {
    /// Already held.
    Duplicate,
    /// Expiry is at or before now.
    Expired,
    /// Send time lies beyond the permitted clock skew.
    FromFuture,
    /// Score below the configured minimum.
    InsufficientWork { score: f64, required: f64 },
    /// Pool at capacity and no resident has a lower score.
    PoolFull,
}

impl RejectReason {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::Expired => "expired",
            Self::FromFuture => "from_future",
            Self::InsufficientWork { .. } => "insufficient_work",
            Self::PoolFull => "pool_full",
        }
    }
}

/// Result of [`crate::MessagePool::insert`].
#[derive(Clone, Debug, PartialEq)]
pub enum InsertOutcome {
    Accepted(Hash),
    Rejected(RejectReason),
}

impl InsertOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Snapshot of pool occupancy.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PoolStatus {
    pub envelopes: usize,
    pub bytes: usize,
    pub capacity: usize,
    pub oldest_expiry: Option<u32>,
}
