//! # Transaction Entities
//!
//! Value types shared by the decoder, the signer and callers executing
//! transactions.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::fmt;

/// How much validation `Transaction::from_rlp` performs up front.
///
/// Variants are ordered: every mode includes the checks of the ones
/// before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CheckTransaction {
    /// Structural decode only.
    None,
    /// Signature shape and intrinsic gas.
    Cheap,
    /// `Cheap` plus eager sender recovery.
    #[default]
    Everything,
}

/// Whether `rlp_bytes` appends the `v, r, s` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeSignature {
    WithSignature,
    WithoutSignature,
}

impl IncludeSignature {
    pub fn field_count(self) -> usize {
        match self {
            IncludeSignature::WithSignature => 9,
            IncludeSignature::WithoutSignature => 6,
        }
    }
}

/// Message call to an existing account, or creation of a new contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    MessageCall,
    ContractCreation,
}

/// Raw `v, r, s` signature triple as carried on the wire, with `v`
/// already reduced to the recovery id (`0` or `1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignatureFields {
    pub v: u8,
    pub r: U256,
    pub s: U256,
}

impl SignatureFields {
    pub fn r_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.r.to_big_endian(&mut out);
        out
    }

    pub fn s_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.s.to_big_endian(&mut out);
        out
    }

    /// `r ‖ s` as expected by the curve library.
    pub fn compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r_bytes());
        out[32..].copy_from_slice(&self.s_bytes());
        out
    }
}

/// Outcome of executing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub gas_used: U256,
    /// Address of the created contract; zero for message calls.
    pub new_address: Address,
    pub output: Vec<u8>,
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}, {}, {}}}",
            self.gas_used,
            hex::encode(self.new_address),
            hex::encode(&self.output)
        )
    }
}
