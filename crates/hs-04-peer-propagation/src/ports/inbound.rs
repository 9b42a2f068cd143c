//! Inbound ports (API) for Peer Propagation subsystem.

use std::sync::Arc;

use hs_01_envelope::{Envelope, FullTopic, TopicMask};
use hs_03_watch_registry::WatchId;
use shared_types::Hash;

use crate::domain::{HostError, PeerId, PostRequest};

/// Local API for applications embedding a node.
pub trait HushApi: Send + Sync {
    /// Seals, stamps and publishes a message. Returns the envelope hash.
    fn post(&self, request: PostRequest) -> Result<Hash, HostError>;

    fn install_watch(&self, mask: TopicMask) -> WatchId;

    fn uninstall_watch(&self, id: WatchId) -> Result<(), HostError>;

    /// Drains the hashes that arrived for the watch since the last call.
    fn check_watch(&self, id: WatchId) -> Result<Vec<Hash>, HostError>;

    fn envelope(&self, hash: &Hash) -> Result<Arc<Envelope>, HostError>;

    /// Full topics the watch was installed with, for opening its envelopes.
    fn full_topics(&self, id: WatchId) -> Result<Vec<FullTopic>, HostError>;

    /// Hashes of every live pooled envelope matching the watch, regardless
    /// of whether it was already drained.
    fn messages(&self, id: WatchId) -> Result<Vec<Hash>, HostError>;
}

/// Connection events delivered by the transport.
///
/// Each connection may deliver on its own task; implementations must be
/// safe to call concurrently for different peers.
pub trait PeerEvents: Send + Sync {
    fn on_connect(&self, peer: PeerId);

    fn on_disconnect(&self, peer: PeerId);

    /// Handles one raw packet from `peer`. Never fails: bad input is logged
    /// and dropped.
    fn receive(&self, peer: PeerId, packet: &[u8]);
}
