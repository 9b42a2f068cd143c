//! # Domain Layer for the Message Pool
//!
//! - **entities**: `PoolConfig`, `InsertOutcome`, `RejectReason`, `PoolStatus`
//! - **pool**: the `MessagePool` store
//! - **errors**: lookup failures

mod entities;
mod errors;
mod pool;

pub use entities::*;
pub use errors::*;
pub use pool::*;
