//! Intrinsic gas (Frontier schedule).

use primitive_types::U256;

use super::entities::TransactionKind;

/// Base cost of a message call.
pub const TX_GAS: u64 = 21_000;
/// Base cost of a contract creation.
pub const TX_CREATE_GAS: u64 = 53_000;
pub const TX_DATA_ZERO_GAS: u64 = 4;
pub const TX_DATA_NON_ZERO_GAS: u64 = 68;

/// Gas charged before execution starts: base cost plus a per-byte fee
/// for the payload.
pub fn gas_required_for(data: &[u8], kind: TransactionKind) -> U256 {
    let base = match kind {
        TransactionKind::MessageCall => TX_GAS,
        TransactionKind::ContractCreation => TX_CREATE_GAS,
    };
    let zeros = data.iter().filter(|&&b| b == 0).count() as u64;
    let non_zeros = data.len() as u64 - zeros;
    U256::from(base)
        + U256::from(zeros) * U256::from(TX_DATA_ZERO_GAS)
        + U256::from(non_zeros) * U256::from(TX_DATA_NON_ZERO_GAS)
}
