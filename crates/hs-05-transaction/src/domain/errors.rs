//! # Transaction Errors
//!
//! Decode and validation failures, plus the closed taxonomy of exceptions a
//! transaction can end with once executed.

use primitive_types::U256;
use std::fmt;
use thiserror::Error;

/// Errors raised while decoding or validating a transaction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// Outer structure is not a transaction record.
    #[error("Malformed transaction encoding: {reason}")]
    MalformedEncoding { reason: String },

    /// A specific field failed to decode.
    #[error("Invalid transaction field {index} (0x{data}): {reason}")]
    BadField {
        index: usize,
        /// Hex of the raw field item.
        data: String,
        reason: String,
    },

    /// Signature triple out of range, or no public key recoverable from it.
    #[error("Invalid transaction signature")]
    InvalidSignature,

    /// Gas limit below the intrinsic cost of the transaction.
    #[error("Out of gas (intrinsic): required {required}, supplied {supplied}")]
    OutOfGasIntrinsic { required: U256, supplied: U256 },
}

impl TransactionError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEncoding {
            reason: reason.into(),
        }
    }

    /// Classifies the failure into the execution exception taxonomy.
    pub fn exception(&self) -> TransactionException {
        match self {
            Self::MalformedEncoding { .. } | Self::BadField { .. } => TransactionException::BadRLP,
            Self::InvalidSignature => TransactionException::InvalidSignature,
            Self::OutOfGasIntrinsic { .. } => TransactionException::OutOfGasIntrinsic,
        }
    }
}

/// Every way a transaction can fail, from decoding through execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionException {
    #[default]
    None,
    BadRLP,
    OutOfGasIntrinsic,
    InvalidSignature,
    InvalidNonce,
    NotEnoughCash,
    OutOfGasBase,
    BlockGasLimitReached,
    BadInstruction,
    BadJumpDestination,
    OutOfGas,
    OutOfStack,
    StackUnderflow,
    Unknown,
}

impl TransactionException {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::BadRLP => "BadRLP",
            Self::OutOfGasIntrinsic => "OutOfGasIntrinsic",
            Self::InvalidSignature => "InvalidSignature",
            Self::InvalidNonce => "InvalidNonce",
            Self::NotEnoughCash => "NotEnoughCash",
            Self::OutOfGasBase => "OutOfGasBase",
            Self::BlockGasLimitReached => "BlockGasLimitReached",
            Self::BadInstruction => "BadInstruction",
            Self::BadJumpDestination => "BadJumpDestination",
            Self::OutOfGas => "OutOfGas",
            Self::OutOfStack => "OutOfStack",
            Self::StackUnderflow => "StackUnderflow",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TransactionException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&TransactionError> for TransactionException {
    fn from(error: &TransactionError) -> Self {
        error.exception()
    }
}
