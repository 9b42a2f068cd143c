//! # Core Entities
//!
//! Fixed-size byte aliases and the Keccak-256 primitive every subsystem
//! hashes with.

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// A 20-byte account address (right-most 160 bits of a public key hash).
pub type Address = [u8; 20];

/// The all-zero address, used as the "no sender" sentinel.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derives an address from a 64-byte uncompressed public key (no 0x04 prefix).
pub fn address_from_public_key(public_key: &[u8; 64]) -> Address {
    let hash = keccak256(public_key);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Address of a secp256k1 verifying key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let mut raw = [0u8; 64];
    raw.copy_from_slice(&point.as_bytes()[1..]);
    address_from_public_key(&raw)
}

/// Lowercase hex rendering of a hash, abbreviated for log fields.
pub fn short_hex(bytes: &[u8]) -> String {
    let take = bytes.len().min(4);
    format!("{}..", hex::encode(&bytes[..take]))
}

/// A 32-byte hash wrapper with hex `Display`, for logs and serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexHash(pub Hash);

impl std::fmt::Display for HexHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<Hash> for HexHash {
    fn from(hash: Hash) -> Self {
        Self(hash)
    }
}
