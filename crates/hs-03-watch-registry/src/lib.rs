//! # Watch Registry Subsystem (hs-03)
//!
//! Local consumers register a [`TopicMask`](hs_01_envelope::TopicMask) and
//! receive a [`WatchId`]. Every envelope admitted to the pool is offered to
//! the registry; the hashes of matching envelopes accumulate in the watch's
//! pending set until the consumer drains them.
//!
//! Pending sets are ordered by arrival and deduplicated, so an envelope that
//! reaches a node over several paths is reported once.

pub mod domain;
pub mod registry;

pub use domain::*;
pub use registry::WatchRegistry;
