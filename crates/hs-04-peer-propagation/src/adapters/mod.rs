//! Adapters for the Peer Propagation ports.

pub mod memory;
