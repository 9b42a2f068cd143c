//! Error types for peer propagation and the local API.

use hs_01_envelope::{OpenError, SealError, TopicError};
use hs_02_message_pool::{PoolError, RejectReason};
use hs_03_watch_registry::WatchError;
use thiserror::Error;

use super::entities::PeerId;

/// Transport and wire-level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PropagationError {
    #[error("Unknown peer: {0}")]
    UnknownPeer(PeerId),

    #[error("Peer disconnected: {0}")]
    PeerDisconnected(PeerId),

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    #[error("Unknown packet id: {0}")]
    UnknownPacket(u8),
}

impl From<rlp::DecoderError> for PropagationError {
    fn from(err: rlp::DecoderError) -> Self {
        Self::MalformedPacket(err.to_string())
    }
}

/// Errors surfaced by the local node API.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    #[error(transparent)]
    Topic(#[from] TopicError),

    #[error(transparent)]
    Seal(#[from] SealError),

    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("Work target of {requested} bits exceeds the maximum of {max}")]
    WorkTargetTooHigh { requested: u32, max: u32 },

    /// The local pool refused the freshly sealed envelope.
    #[error("Envelope rejected by local pool: {0:?}")]
    Rejected(RejectReason),
}
