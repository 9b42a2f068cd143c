//! # Envelope Subsystem (hs-01)
//!
//! Everything a Hush node needs to turn a payload into a gossip-ready
//! envelope and back.
//!
//! ## Architecture Role
//!
//! ```text
//! post(payload, topics) ──→ [Topic Engine] ──→ [Message seal] ──→ [Envelope + PoW]
//!                                                                     │ rlp
//!                                                                     ↓
//!                                                           [Pool / Peers (hs-02, hs-04)]
//! ```
//!
//! ## Topics
//!
//! A topic string hashes to a 32-byte [`FullTopic`]. Only the 4-byte
//! [`Topic`] commitment derived from it travels on the wire, so relays can
//! route on topics without learning the key material needed to open the
//! message. A [`TopicMask`] is what a watcher matches envelopes against.
//!
//! ## Envelope Wire Format
//!
//! ```text
//! rlp([expiry, ttl, [topic_0 .. topic_n], data, nonce])
//! ```
//!
//! The identity of an envelope is the Keccak-256 of that encoding.

pub mod domain;

pub use domain::*;
