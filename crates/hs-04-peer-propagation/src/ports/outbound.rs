//! Outbound ports (SPI) for Peer Propagation subsystem.

use crate::domain::{PeerId, PropagationError};

/// Transport used to reach connected peers.
pub trait PeerNetwork: Send + Sync {
    /// Hands an encoded packet to the transport for `peer`.
    ///
    /// Must not block: delivery is fire-and-forget from the engine's side.
    fn send(&self, peer: PeerId, packet: Vec<u8>) -> Result<(), PropagationError>;
}
