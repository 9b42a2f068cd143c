//! # Transaction
//!
//! Wire layout (RLP list, in order):
//!
//! ```text
//! [nonce, gasPrice, gas, to, value, data, v, r, s]
//! ```
//!
//! `to` is empty for contract creation. `v` travels as `27 + recovery id`.
//! The signing hash is keccak-256 of the first six fields.

use k256::ecdsa::SigningKey;
use primitive_types::U256;
use rlp::{Rlp, RlpStream};
use shared_types::{keccak256, short_hex, Address, Hash, ZERO_ADDRESS};
use std::sync::OnceLock;
use tracing::{debug, warn};

use hush_telemetry::{metric_inc, SENDER_RECOVERY_FAILURES};

use super::entities::{CheckTransaction, IncludeSignature, SignatureFields, TransactionKind};
use super::errors::TransactionError;
use super::gas::gas_required_for;
use super::signature;

const FIELD_COUNT: usize = 9;
const V_OFFSET: u8 = 27;

/// A signed (or not yet signed) transaction record.
///
/// Immutable once decoded; the sender and the intrinsic gas are derived on
/// first use and cached.
#[derive(Debug, Clone)]
pub struct Transaction {
    nonce: U256,
    gas_price: U256,
    gas: U256,
    kind: TransactionKind,
    to: Option<Address>,
    value: U256,
    data: Vec<u8>,
    signature: SignatureFields,
    sender: OnceLock<Address>,
    gas_required: OnceLock<U256>,
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.nonce == other.nonce
            && self.gas_price == other.gas_price
            && self.gas == other.gas
            && self.kind == other.kind
            && self.to == other.to
            && self.value == other.value
            && self.data == other.data
            && self.signature == other.signature
    }
}

impl Eq for Transaction {}

impl Transaction {
    /// Unsigned message call to `to`.
    pub fn message_call(
        nonce: U256,
        gas_price: U256,
        gas: U256,
        to: Address,
        value: U256,
        data: Vec<u8>,
    ) -> Self {
        Self::unsigned(nonce, gas_price, gas, Some(to), value, data)
    }

    /// Unsigned contract creation with `data` as init code.
    pub fn contract_creation(
        nonce: U256,
        gas_price: U256,
        gas: U256,
        value: U256,
        data: Vec<u8>,
    ) -> Self {
        Self::unsigned(nonce, gas_price, gas, None, value, data)
    }

    fn unsigned(
        nonce: U256,
        gas_price: U256,
        gas: U256,
        to: Option<Address>,
        value: U256,
        data: Vec<u8>,
    ) -> Self {
        let kind = match to {
            Some(_) => TransactionKind::MessageCall,
            None => TransactionKind::ContractCreation,
        };
        Self {
            nonce,
            gas_price,
            gas,
            kind,
            to,
            value,
            data,
            signature: SignatureFields::default(),
            sender: OnceLock::new(),
            gas_required: OnceLock::new(),
        }
    }

    /// Decodes and validates a transaction.
    ///
    /// Fields are decoded in wire order and the first failure is reported
    /// with its index. Signature shape and payment are checked afterwards,
    /// depending on `check`.
    pub fn from_rlp(bytes: &[u8], check: CheckTransaction) -> Result<Self, TransactionError> {
        let rlp = Rlp::new(bytes);
        if !rlp.is_list() {
            return Err(TransactionError::malformed("transaction RLP must be a list"));
        }
        let total = rlp
            .payload_info()
            .map_err(|e| TransactionError::malformed(format!("{e:?}")))?
            .total();
        if total != bytes.len() {
            return Err(TransactionError::malformed(format!(
                "{} trailing bytes after transaction",
                bytes.len().saturating_sub(total)
            )));
        }

        let nonce = decode_int(&rlp, 0)?;
        let gas_price = decode_int(&rlp, 1)?;
        let gas = decode_int(&rlp, 2)?;
        let to = decode_recipient(&rlp, 3)?;
        let value = decode_int(&rlp, 4)?;
        let data = decode_data(&rlp, 5)?;
        let v = decode_field(&rlp, 6, |item| item.as_val::<u8>())?;
        let r = decode_int(&rlp, 7)?;
        let s = decode_int(&rlp, 8)?;

        let count = rlp
            .item_count()
            .map_err(|e| TransactionError::malformed(format!("{e:?}")))?;
        if count > FIELD_COUNT {
            return Err(TransactionError::malformed(format!(
                "too many fields in transaction RLP: {count}"
            )));
        }

        let mut tx = Self::unsigned(nonce, gas_price, gas, to, value, data);
        tx.signature = SignatureFields {
            v: v.wrapping_sub(V_OFFSET),
            r,
            s,
        };

        if check >= CheckTransaction::Cheap && !tx.signature.is_valid() {
            return Err(TransactionError::InvalidSignature);
        }
        if check == CheckTransaction::Everything {
            tx.sender()?;
        }
        if check >= CheckTransaction::Cheap && !tx.check_payment() {
            return Err(TransactionError::OutOfGasIntrinsic {
                required: tx.gas_required(),
                supplied: tx.gas,
            });
        }

        debug!(hash = %short_hex(&tx.hash()), ?check, "Decoded transaction");
        Ok(tx)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn nonce(&self) -> U256 {
        self.nonce
    }

    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    pub fn gas(&self) -> U256 {
        self.gas
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn is_creation(&self) -> bool {
        self.kind == TransactionKind::ContractCreation
    }

    /// Recipient, `None` for contract creation.
    pub fn to(&self) -> Option<Address> {
        self.to
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn signature(&self) -> &SignatureFields {
        &self.signature
    }

    // =========================================================================
    // SIGNING AND RECOVERY
    // =========================================================================

    /// Signs the unsigned encoding with `key`, replacing any previous
    /// signature.
    pub fn sign(&mut self, key: &SigningKey) -> Result<(), TransactionError> {
        let fields = signature::sign(key, &self.signing_hash())?;
        if !fields.is_valid() {
            return Err(TransactionError::InvalidSignature);
        }
        self.signature = fields;
        self.sender = OnceLock::new();
        Ok(())
    }

    /// Address that signed this transaction. Recovered once, then cached.
    pub fn sender(&self) -> Result<Address, TransactionError> {
        if let Some(sender) = self.sender.get() {
            return Ok(*sender);
        }
        let recovered = signature::recover(&self.signing_hash(), &self.signature)
            .inspect_err(|_| metric_inc!(SENDER_RECOVERY_FAILURES))?;
        Ok(*self.sender.get_or_init(|| recovered))
    }

    /// Like [`sender`](Self::sender), but yields the zero address when the
    /// signature does not recover.
    pub fn safe_sender(&self) -> Address {
        match self.sender() {
            Ok(sender) => sender,
            Err(e) => {
                warn!(
                    hash = %short_hex(&self.hash()),
                    error = %e,
                    "Sender recovery failed; using zero address"
                );
                ZERO_ADDRESS
            }
        }
    }

    // =========================================================================
    // GAS
    // =========================================================================

    /// Intrinsic gas for this transaction. Computed once, then cached.
    pub fn gas_required(&self) -> U256 {
        *self
            .gas_required
            .get_or_init(|| gas_required_for(&self.data, self.kind))
    }

    pub fn gas_required_for(data: &[u8], kind: TransactionKind) -> U256 {
        gas_required_for(data, kind)
    }

    /// True when the gas limit covers the intrinsic cost.
    pub fn check_payment(&self) -> bool {
        self.gas >= self.gas_required()
    }

    // =========================================================================
    // ENCODING
    // =========================================================================

    pub fn stream_rlp(&self, s: &mut RlpStream, include: IncludeSignature) {
        s.begin_list(include.field_count());
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.gas);
        match &self.to {
            Some(to) => s.append(&to.as_slice()),
            None => s.append_empty_data(),
        };
        s.append(&self.value);
        s.append(&self.data);
        if include == IncludeSignature::WithSignature {
            s.append(&self.signature.v.wrapping_add(V_OFFSET));
            s.append(&self.signature.r);
            s.append(&self.signature.s);
        }
    }

    pub fn rlp_bytes(&self, include: IncludeSignature) -> Vec<u8> {
        let mut s = RlpStream::new();
        self.stream_rlp(&mut s, include);
        s.out().to_vec()
    }

    /// Hash the signature commits to.
    pub fn signing_hash(&self) -> Hash {
        keccak256(&self.rlp_bytes(IncludeSignature::WithoutSignature))
    }

    /// Identity of the signed transaction.
    pub fn hash(&self) -> Hash {
        keccak256(&self.rlp_bytes(IncludeSignature::WithSignature))
    }
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn decode_field<T>(
    rlp: &Rlp,
    index: usize,
    decode: impl FnOnce(&Rlp) -> Result<T, rlp::DecoderError>,
) -> Result<T, TransactionError> {
    let item = rlp.at(index).map_err(|e| bad_field(index, &[], e))?;
    decode(&item).map_err(|e| bad_field(index, item.as_raw(), e))
}

fn decode_int(rlp: &Rlp, index: usize) -> Result<U256, TransactionError> {
    decode_field(rlp, index, |item| item.as_val::<U256>())
}

/// Empty means contract creation; otherwise exactly 20 bytes.
fn decode_recipient(rlp: &Rlp, index: usize) -> Result<Option<Address>, TransactionError> {
    decode_field(rlp, index, |item| {
        if item.is_list() {
            return Err(rlp::DecoderError::RlpExpectedToBeData);
        }
        let bytes = item.data()?;
        match bytes.len() {
            0 => Ok(None),
            20 => {
                let mut address = [0u8; 20];
                address.copy_from_slice(bytes);
                Ok(Some(address))
            }
            n if n < 20 => Err(rlp::DecoderError::RlpIsTooShort),
            _ => Err(rlp::DecoderError::RlpIsTooBig),
        }
    })
}

fn decode_data(rlp: &Rlp, index: usize) -> Result<Vec<u8>, TransactionError> {
    decode_field(rlp, index, |item| {
        if !item.is_data() {
            return Err(rlp::DecoderError::Custom("transaction data must be a byte string"));
        }
        item.as_val::<Vec<u8>>()
    })
}

fn bad_field(index: usize, raw: &[u8], error: rlp::DecoderError) -> TransactionError {
    TransactionError::BadField {
        index,
        data: hex::encode(raw),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use shared_types::address_of;

    fn key() -> SigningKey {
        SigningKey::random(&mut OsRng)
    }

    fn call(data: Vec<u8>) -> Transaction {
        Transaction::message_call(
            U256::from(7u8),
            U256::from(20_000_000_000u64),
            U256::from(100_000u32),
            [0x11; 20],
            U256::from(1_000u32),
            data,
        )
    }

    fn signed(key: &SigningKey, tx: Transaction) -> Vec<u8> {
        let mut tx = tx;
        tx.sign(key).unwrap();
        tx.rlp_bytes(IncludeSignature::WithSignature)
    }

    /// Builds a raw list of `count` items written by `fields`.
    fn raw(fields: impl FnOnce(&mut RlpStream), count: usize) -> Vec<u8> {
        let mut s = RlpStream::new_list(count);
        fields(&mut s);
        s.out().to_vec()
    }

    #[test]
    fn test_sign_encode_decode_recovers_signer() {
        let key = key();
        let bytes = signed(&key, call(vec![1, 2, 3]));

        let tx = Transaction::from_rlp(&bytes, CheckTransaction::Everything).unwrap();

        assert_eq!(tx.sender().unwrap(), address_of(key.verifying_key()));
        assert_eq!(tx.to(), Some([0x11; 20]));
        assert_eq!(tx.data(), &[1, 2, 3]);
        assert_eq!(tx.kind(), TransactionKind::MessageCall);
        assert_eq!(tx.rlp_bytes(IncludeSignature::WithSignature), bytes);
    }

    #[test]
    fn test_contract_creation_round_trip() {
        let key = key();
        let tx = Transaction::contract_creation(
            U256::zero(),
            U256::one(),
            U256::from(60_000u32),
            U256::zero(),
            vec![0x60, 0x00],
        );
        let bytes = signed(&key, tx);

        let decoded = Transaction::from_rlp(&bytes, CheckTransaction::Cheap).unwrap();

        assert!(decoded.is_creation());
        assert_eq!(decoded.to(), None);
        assert_eq!(decoded.sender().unwrap(), address_of(key.verifying_key()));
    }

    #[test]
    fn test_v_travels_offset_by_27() {
        let key = key();
        let bytes = signed(&key, call(vec![]));
        let rlp = Rlp::new(&bytes);
        let v: u8 = rlp.val_at(6).unwrap();
        assert!(v == 27 || v == 28);

        let tx = Transaction::from_rlp(&bytes, CheckTransaction::None).unwrap();
        assert_eq!(tx.signature().v, v - 27);
    }

    #[test]
    fn test_signing_hash_excludes_signature() {
        let key = key();
        let mut tx = call(vec![9]);
        let before = tx.signing_hash();
        tx.sign(&key).unwrap();
        assert_eq!(tx.signing_hash(), before);
        assert_ne!(tx.hash(), before);
    }

    #[test]
    fn test_tampered_s_fails_sender() {
        let key = key();
        let mut tx = call(vec![]);
        tx.sign(&key).unwrap();
        tx.signature.s = U256::zero();
        let bytes = tx.rlp_bytes(IncludeSignature::WithSignature);

        let decoded = Transaction::from_rlp(&bytes, CheckTransaction::None).unwrap();

        assert_eq!(decoded.sender(), Err(TransactionError::InvalidSignature));
        assert_eq!(decoded.safe_sender(), ZERO_ADDRESS);
    }

    #[test]
    fn test_high_s_form_agrees_across_check_levels() {
        let key = key();
        let mut tx = call(vec![]);
        tx.sign(&key).unwrap();
        let order = U256::from_big_endian(&signature::SECP256K1_ORDER);
        tx.signature.s = order - tx.signature.s;
        tx.signature.v ^= 1;
        let bytes = tx.rlp_bytes(IncludeSignature::WithSignature);

        let cheap = Transaction::from_rlp(&bytes, CheckTransaction::Cheap).unwrap();
        let full = Transaction::from_rlp(&bytes, CheckTransaction::Everything).unwrap();

        let signer = address_of(key.verifying_key());
        assert_eq!(cheap.sender(), Ok(signer));
        assert_eq!(full.safe_sender(), signer);
    }

    #[test]
    fn test_tampered_r_never_yields_signer() {
        let key = key();
        let mut tx = call(vec![]);
        tx.sign(&key).unwrap();
        tx.signature.r = tx.signature.r ^ U256::one();
        let bytes = tx.rlp_bytes(IncludeSignature::WithSignature);

        let decoded = Transaction::from_rlp(&bytes, CheckTransaction::None).unwrap();

        match decoded.sender() {
            Ok(sender) => assert_ne!(sender, address_of(key.verifying_key())),
            Err(e) => {
                assert_eq!(e, TransactionError::InvalidSignature);
                assert_eq!(decoded.safe_sender(), ZERO_ADDRESS);
            }
        }
    }

    #[test]
    fn test_cheap_check_rejects_out_of_range_r() {
        let key = key();
        let mut tx = call(vec![]);
        tx.sign(&key).unwrap();
        tx.signature.r = U256::MAX;
        let bytes = tx.rlp_bytes(IncludeSignature::WithSignature);

        assert_eq!(
            Transaction::from_rlp(&bytes, CheckTransaction::Cheap),
            Err(TransactionError::InvalidSignature)
        );
        assert!(Transaction::from_rlp(&bytes, CheckTransaction::None).is_ok());
    }

    #[test]
    fn test_unsigned_record_rejected_when_checked() {
        let bytes = call(vec![]).rlp_bytes(IncludeSignature::WithSignature);
        assert_eq!(
            Transaction::from_rlp(&bytes, CheckTransaction::Cheap).unwrap_err().exception(),
            crate::TransactionException::InvalidSignature
        );
    }

    #[test]
    fn test_insufficient_gas_reports_requirement() {
        let key = key();
        let mut tx = call(vec![1, 0]);
        tx.gas = U256::from(21_000u32);
        let bytes = signed(&key, tx);

        assert_eq!(
            Transaction::from_rlp(&bytes, CheckTransaction::Cheap),
            Err(TransactionError::OutOfGasIntrinsic {
                required: U256::from(21_000u32 + 68 + 4),
                supplied: U256::from(21_000u32),
            })
        );
        assert!(Transaction::from_rlp(&bytes, CheckTransaction::None).is_ok());
    }

    #[test]
    fn test_signature_checked_before_payment() {
        let mut tx = call(vec![]);
        tx.gas = U256::zero();
        let bytes = tx.rlp_bytes(IncludeSignature::WithSignature);
        assert_eq!(
            Transaction::from_rlp(&bytes, CheckTransaction::Cheap),
            Err(TransactionError::InvalidSignature)
        );
    }

    #[test]
    fn test_not_a_list_is_malformed() {
        let err = Transaction::from_rlp(&[0x83, 1, 2, 3], CheckTransaction::None).unwrap_err();
        assert!(matches!(err, TransactionError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_trailing_bytes_are_malformed() {
        let mut bytes = signed(&key(), call(vec![]));
        bytes.push(0);
        let err = Transaction::from_rlp(&bytes, CheckTransaction::None).unwrap_err();
        assert!(matches!(err, TransactionError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_extra_field_is_malformed() {
        let bytes = raw(
            |s| {
                s.append(&1u8).append(&1u8).append(&1u8);
                s.append_empty_data();
                s.append(&0u8).append_empty_data();
                s.append(&27u8).append(&1u8).append(&1u8);
                s.append(&0u8);
            },
            10,
        );
        let err = Transaction::from_rlp(&bytes, CheckTransaction::None).unwrap_err();
        assert!(matches!(err, TransactionError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_missing_field_reports_its_index() {
        let bytes = raw(
            |s| {
                for _ in 0..7 {
                    s.append_empty_data();
                }
            },
            7,
        );
        match Transaction::from_rlp(&bytes, CheckTransaction::None) {
            Err(TransactionError::BadField { index, .. }) => assert_eq!(index, 7),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_short_recipient_is_bad_field_three() {
        let bytes = raw(
            |s| {
                s.append(&1u8).append(&1u8).append(&1u8);
                s.append(&vec![0xaa_u8; 19]);
                s.append(&0u8).append_empty_data();
                s.append(&27u8).append(&1u8).append(&1u8);
            },
            9,
        );
        match Transaction::from_rlp(&bytes, CheckTransaction::None) {
            Err(TransactionError::BadField { index, data, .. }) => {
                assert_eq!(index, 3);
                assert!(data.ends_with(&"aa".repeat(19)));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_list_payload_is_bad_field_five() {
        let bytes = raw(
            |s| {
                s.append(&1u8).append(&1u8).append(&1u8);
                s.append_empty_data();
                s.append(&0u8);
                s.begin_list(1).append(&1u8);
                s.append(&27u8).append(&1u8).append(&1u8);
            },
            9,
        );
        match Transaction::from_rlp(&bytes, CheckTransaction::None) {
            Err(TransactionError::BadField { index, .. }) => assert_eq!(index, 5),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_integer_with_leading_zero_is_bad_field() {
        let bytes = raw(
            |s| {
                s.append(&vec![0u8, 1]);
                for _ in 1..9 {
                    s.append_empty_data();
                }
            },
            9,
        );
        match Transaction::from_rlp(&bytes, CheckTransaction::None) {
            Err(TransactionError::BadField { index, .. }) => assert_eq!(index, 0),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_gas_required_is_cached_and_matches_schedule() {
        let tx = call(vec![0, 0, 5]);
        let expected = Transaction::gas_required_for(&[0, 0, 5], TransactionKind::MessageCall);
        assert_eq!(tx.gas_required(), expected);
        assert_eq!(tx.gas_required(), U256::from(21_000u32 + 8 + 68));
        assert!(tx.check_payment());
    }

    #[test]
    fn test_resigning_clears_cached_sender() {
        let first = key();
        let second = key();
        let mut tx = call(vec![]);
        tx.sign(&first).unwrap();
        assert_eq!(tx.sender().unwrap(), address_of(first.verifying_key()));

        tx.sign(&second).unwrap();
        assert_eq!(tx.sender().unwrap(), address_of(second.verifying_key()));
    }
}
