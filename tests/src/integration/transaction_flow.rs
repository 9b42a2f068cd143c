//! # Transactions Carried as Message Payloads
//!
//! A signed transaction is gossiped inside a signed message. The receiver
//! decodes it, recovers the sender and checks it against the message
//! signer.

#[cfg(test)]
mod tests {
    use super::super::{init_test_logging, node, wait_until, SETTLE};
    use hs_01_envelope::TopicMask;
    use hs_04_peer_propagation::{HushApi, PostRequest, WorkBudget};
    use hs_05_transaction::{
        CheckTransaction, IncludeSignature, Transaction, TransactionError, TransactionException,
    };
    use k256::ecdsa::SigningKey;
    use primitive_types::U256;
    use rand::rngs::OsRng;
    use shared_types::ZERO_ADDRESS;

    fn transfer(to: [u8; 20]) -> Transaction {
        Transaction::message_call(
            U256::zero(),
            U256::from(1_000_000_000u64),
            U256::from(21_000u32),
            to,
            U256::from(5u8),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_gossiped_transaction_recovers_message_signer() {
        init_test_logging();
        let key = SigningKey::random(&mut OsRng);
        let mut tx = transfer([0x42; 20]);
        tx.sign(&key).unwrap();
        let raw = tx.rlp_bytes(IncludeSignature::WithSignature);

        let wallet = node();
        let relay = node();
        let watch = relay.host().install_watch(TopicMask::exact(&["tx"]));
        let _link = wallet.connect(&relay);

        wallet
            .host()
            .post(
                PostRequest::new(raw, &["tx"])
                    .work(WorkBudget::Bits(4))
                    .signed_by(key.clone()),
            )
            .unwrap();

        let host = relay.host();
        let mut hashes = Vec::new();
        assert!(
            wait_until(SETTLE, || {
                hashes.extend(host.check_watch(watch).unwrap());
                !hashes.is_empty()
            })
            .await
        );
        let topics = host.full_topics(watch).unwrap();
        let message = host.envelope(&hashes[0]).unwrap().open(&topics, None).unwrap();

        let received = Transaction::from_rlp(message.payload(), CheckTransaction::Everything).unwrap();
        assert_eq!(received, tx);
        assert_eq!(Some(received.sender().unwrap()), message.from_address());
    }

    #[test]
    fn test_unsigned_encoding_then_sign_round_trip() {
        let key = SigningKey::random(&mut OsRng);
        let unsigned = transfer([0x01; 20]).rlp_bytes(IncludeSignature::WithoutSignature);
        assert_eq!(rlp::Rlp::new(&unsigned).item_count().unwrap(), 6);

        let mut tx = transfer([0x01; 20]);
        tx.sign(&key).unwrap();
        let decoded = Transaction::from_rlp(
            &tx.rlp_bytes(IncludeSignature::WithSignature),
            CheckTransaction::Cheap,
        )
        .unwrap();

        assert_eq!(decoded.rlp_bytes(IncludeSignature::WithoutSignature), unsigned);
        assert_eq!(decoded.sender().unwrap(), tx.sender().unwrap());
        assert_ne!(decoded.safe_sender(), ZERO_ADDRESS);
    }

    #[test]
    fn test_out_of_range_s_falls_back_to_zero_address() {
        let key = SigningKey::random(&mut OsRng);
        let mut tx = transfer([0x01; 20]);
        tx.sign(&key).unwrap();

        let mut raw = rlp::RlpStream::new_list(9);
        let original = tx.rlp_bytes(IncludeSignature::WithSignature);
        let fields = rlp::Rlp::new(&original);
        for i in 0..8 {
            raw.append_raw(fields.at(i).unwrap().as_raw(), 1);
        }
        raw.append(&U256::MAX);
        let tampered = raw.out().to_vec();

        let lazy = Transaction::from_rlp(&tampered, CheckTransaction::None).unwrap();
        assert_eq!(lazy.sender(), Err(TransactionError::InvalidSignature));
        assert_eq!(lazy.safe_sender(), ZERO_ADDRESS);

        let err = Transaction::from_rlp(&tampered, CheckTransaction::Everything).unwrap_err();
        assert_eq!(err.exception(), TransactionException::InvalidSignature);
    }

    #[test]
    fn test_truncated_record_is_bad_rlp() {
        let key = SigningKey::random(&mut OsRng);
        let mut tx = transfer([0x01; 20]);
        tx.sign(&key).unwrap();
        let raw = tx.rlp_bytes(IncludeSignature::WithSignature);

        let err = Transaction::from_rlp(&raw[..raw.len() - 1], CheckTransaction::None).unwrap_err();
        assert_eq!(err.exception(), TransactionException::BadRLP);
    }
}
