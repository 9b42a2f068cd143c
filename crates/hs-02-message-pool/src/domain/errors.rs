//! Message pool error types.

use shared_types::{Hash, HexHash};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoolError {
    /// No envelope with this hash is held (never seen, or already expired).
    #[error("Envelope not found: {}", hex(.0))]
    NotFound(Hash),
}

fn hex(hash: &Hash) -> HexHash {
    HexHash(*hash)
}
