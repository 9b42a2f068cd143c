//! Domain layer for transaction decoding and sender recovery.

pub mod entities;
pub mod errors;
pub mod gas;
pub mod signature;
pub mod transaction;
