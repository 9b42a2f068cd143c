//! # Transaction Sender Recovery (hs-05)
//!
//! Decodes signed transaction records, validates them field by field and
//! recovers the sender address from the secp256k1 signature.
//!
//! ## Validation Modes
//!
//! | Mode | Signature shape | Sender recovery | Intrinsic gas |
//! |------|-----------------|-----------------|---------------|
//! | `CheckTransaction::None` | lazy | lazy | not checked |
//! | `CheckTransaction::Cheap` | at decode | lazy | at decode |
//! | `CheckTransaction::Everything` | at decode | at decode | at decode |
//!
//! The sender and the intrinsic gas are computed at most once per
//! transaction and cached.

pub mod domain;

pub use domain::entities::{
    CheckTransaction, ExecutionResult, IncludeSignature, SignatureFields, TransactionKind,
};
pub use domain::errors::{TransactionError, TransactionException};
pub use domain::gas::{
    gas_required_for, TX_CREATE_GAS, TX_DATA_NON_ZERO_GAS, TX_DATA_ZERO_GAS, TX_GAS,
};
pub use domain::transaction::Transaction;
