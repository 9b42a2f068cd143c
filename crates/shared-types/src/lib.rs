//! # Shared Types Crate
//!
//! Primitive types used across the Hush subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Hash`, `Address` and `U256` are defined once
//!   here and re-exported by every subsystem crate that needs them.
//! - **Injectable Time**: everything that compares against "now" takes a
//!   [`TimeSource`] so expiry logic is testable without sleeping.

pub mod entities;
pub mod time;

pub use entities::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource, Timestamp};
