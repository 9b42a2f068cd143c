//! # Domain Layer for Envelopes
//!
//! Pure logic with no I/O dependencies.
//!
//! ## Contents
//!
//! - **topic**: `FullTopic`, `Topic`, `Topics`, `TopicMask`
//! - **envelope**: the `Envelope` entity and its canonical codec
//! - **work**: proof-of-work stamping and scoring
//! - **message**: sealing payloads into envelopes and opening them again
//! - **errors**: codec, seal and open failures

mod envelope;
mod errors;
mod message;
mod topic;
mod work;

pub use envelope::*;
pub use errors::*;
pub use message::*;
pub use topic::*;
pub use work::*;
