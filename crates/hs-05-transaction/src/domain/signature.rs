//! # secp256k1 Signing and Recovery
//!
//! Range checks run in constant time; recovery and signing delegate to
//! `k256`.
//!
//! Any `s` in `[1, n)` recovers. `k256` only accepts the lower half, so a
//! high `s` is folded to `n - s` with the recovery id flipped before the
//! curve library sees it; both forms name the same key.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use primitive_types::U256;
use shared_types::{address_of, Address, Hash};
use subtle::{Choice, ConstantTimeEq};

use super::entities::SignatureFields;
use super::errors::TransactionError;

/// secp256k1 curve order n
pub(crate) const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

impl SignatureFields {
    /// `r` and `s` in `[1, n)` and `v` a plain recovery id.
    pub fn is_valid(&self) -> bool {
        self.v <= 1 && is_valid_scalar(&self.r_bytes()) && is_valid_scalar(&self.s_bytes())
    }
}

/// Signs `hash` and returns the triple with `v` as a recovery id.
pub fn sign(key: &SigningKey, hash: &Hash) -> Result<SignatureFields, TransactionError> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(hash)
        .map_err(|_| TransactionError::InvalidSignature)?;
    let bytes = signature.to_bytes();
    Ok(SignatureFields {
        v: recovery_id.to_byte(),
        r: U256::from_big_endian(&bytes[..32]),
        s: U256::from_big_endian(&bytes[32..]),
    })
}

/// Recovers the address that produced `signature` over `hash`.
pub fn recover(hash: &Hash, signature: &SignatureFields) -> Result<Address, TransactionError> {
    if !signature.is_valid() {
        return Err(TransactionError::InvalidSignature);
    }
    let signature = low_s(signature);
    let recovery_id =
        RecoveryId::from_byte(signature.v).ok_or(TransactionError::InvalidSignature)?;
    let sig = Signature::from_slice(&signature.compact())
        .map_err(|_| TransactionError::InvalidSignature)?;
    let key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
        .map_err(|_| TransactionError::InvalidSignature)?;
    Ok(address_of(&key))
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// The equivalent signature with `s` in the lower half of the order.
fn low_s(signature: &SignatureFields) -> SignatureFields {
    let order = U256::from_big_endian(&SECP256K1_ORDER);
    if signature.s > order >> 1 {
        SignatureFields {
            v: signature.v ^ 1,
            r: signature.r,
            s: order - signature.s,
        }
    } else {
        *signature
    }
}

/// Constant-time check that `scalar` is in `[1, n)`.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);
    for (s_byte, n_byte) in scalar.iter().zip(SECP256K1_ORDER.iter()) {
        let not_decided = !(less | greater);
        less |= not_decided & Choice::from((s_byte < n_byte) as u8);
        greater |= not_decided & Choice::from((s_byte > n_byte) as u8);
    }

    (!is_zero & less).into()
}
