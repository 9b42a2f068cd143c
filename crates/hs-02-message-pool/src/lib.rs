//! # Message Pool Subsystem (hs-02)
//!
//! Holds every live envelope a node knows about, keyed by envelope hash.
//!
//! ## Admission
//!
//! An envelope is admitted only if it is
//!
//! - not already present,
//! - not expired,
//! - not stamped further in the future than the configured clock skew,
//! - carrying a proof-of-work score of at least `min_pow`.
//!
//! When the pool is full the newcomer may displace the resident with the
//! lowest score, but only if its own score is strictly higher.
//!
//! Rejections are values ([`InsertOutcome::Rejected`]), not errors: a
//! relayed duplicate is the normal case in a flooding network.

pub mod domain;

pub use domain::*;
