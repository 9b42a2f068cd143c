//! Ports for the Peer Propagation subsystem.

pub mod inbound;
pub mod outbound;
