//! # Peer Propagation Subsystem (hs-04)
//!
//! Floods envelopes between connected peers and exposes the local node API.
//!
//! ## Architecture Role
//!
//! ```text
//!  post() ─→ [seal + PoW] ─→ [Message Pool (2)] ─→ [Watch Registry (3)]
//!                                   │
//!                                   ↓ accepted
//!                       per-peer FIFO queues (known-set filtered)
//!                                   │
//!                   ┌───────────────┼───────────────┐
//!                   ↓               ↓               ↓
//!               [Peer A]        [Peer B]        [Peer C]
//! ```
//!
//! ## Flooding Rules
//!
//! - Every accepted envelope is marked known for the peer it came from and
//!   queued for every other connected peer that has not seen it.
//! - Rejected envelopes (duplicate, expired, too little work) are dropped
//!   silently; under flooding that is the common case.
//! - Malformed envelopes from a peer are logged and skipped; the rest of
//!   the packet is still processed.
//! - No subscription information ever crosses the wire.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::memory::{Link, MemoryNetwork, MemoryNode};
pub use domain::*;
pub use ports::inbound::{HushApi, PeerEvents};
pub use ports::outbound::PeerNetwork;
pub use service::HushHost;
