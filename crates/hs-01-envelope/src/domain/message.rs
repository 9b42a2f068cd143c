//! # Message Sealing
//!
//! A message body is `flags ‖ payload ‖ [signature]` and is encrypted with
//! XChaCha20-Poly1305 before it becomes envelope `data`:
//!
//! ```text
//! broadcast:  0x00 ‖ nonce(24) ‖ ciphertext
//! addressed:  0x01 ‖ ephemeral_pubkey(33) ‖ nonce(24) ‖ ciphertext
//! ```
//!
//! Broadcast messages are keyed by the full topics alone, so anyone who
//! knows the topic strings can read them. Addressed messages additionally
//! mix in an ECDH secret with the recipient key.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use k256::ecdh::{diffie_hellman, EphemeralSecret};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use shared_types::{address_of, keccak256, Address, Hash, Timestamp};
use zeroize::Zeroize;

use super::envelope::Envelope;
use super::errors::{OpenError, SealError};
use super::topic::{FullTopic, Topics};

const MODE_BROADCAST: u8 = 0x00;
const MODE_ADDRESSED: u8 = 0x01;

const FLAG_SIGNED: u8 = 0x01;

const NONCE_LEN: usize = 24;
const SIGNATURE_LEN: usize = 65;
const COMPRESSED_KEY_LEN: usize = 33;

/// A payload on its way into an envelope.
#[derive(Clone)]
pub struct OutgoingMessage {
    payload: Vec<u8>,
    from: Option<SigningKey>,
    to: Option<PublicKey>,
}

impl OutgoingMessage {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            from: None,
            to: None,
        }
    }

    /// Signs the payload so recipients can recover the sender.
    pub fn signed_by(mut self, key: SigningKey) -> Self {
        self.from = Some(key);
        self
    }

    /// Restricts opening to the holder of the secret key behind `recipient`.
    pub fn addressed_to(mut self, recipient: PublicKey) -> Self {
        self.to = Some(recipient);
        self
    }

    /// Encrypts the message into a fresh, unstamped envelope.
    pub fn seal(
        &self,
        full_topics: &[FullTopic],
        ttl: u32,
        now: Timestamp,
    ) -> Result<Envelope, SealError> {
        let topics = Topics::from_full(full_topics)?;
        let plaintext = self.plaintext()?;
        let mut topic_key = topic_key(full_topics);

        let data = match &self.to {
            None => {
                let mut out = vec![MODE_BROADCAST];
                out.extend(encrypt(&topic_key, &plaintext)?);
                out
            }
            Some(recipient) => {
                let ephemeral = EphemeralSecret::random(&mut OsRng);
                let shared = ephemeral.diffie_hellman(recipient);
                let mut key = addressed_key(shared.raw_secret_bytes().as_slice(), &topic_key);

                let mut out = vec![MODE_ADDRESSED];
                out.extend_from_slice(ephemeral.public_key().to_encoded_point(true).as_bytes());
                let sealed = encrypt(&key, &plaintext);
                key.zeroize();
                out.extend(sealed?);
                out
            }
        };
        topic_key.zeroize();

        Envelope::new(now, ttl, topics, data)
    }

    fn plaintext(&self) -> Result<Vec<u8>, SealError> {
        let mut body = Vec::with_capacity(1 + self.payload.len() + SIGNATURE_LEN);
        let flags = if self.from.is_some() { FLAG_SIGNED } else { 0 };
        body.push(flags);
        body.extend_from_slice(&self.payload);

        if let Some(key) = &self.from {
            let digest = keccak256(&self.payload);
            let (signature, recovery_id) = key
                .sign_prehash_recoverable(&digest)
                .map_err(|_| SealError::SigningFailed)?;
            body.extend_from_slice(&signature.to_bytes());
            body.push(recovery_id.to_byte());
        }
        Ok(body)
    }
}

/// An opened envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    from: Option<VerifyingKey>,
    to: Option<PublicKey>,
    payload: Vec<u8>,
    topics: Vec<FullTopic>,
}

impl Message {
    /// Public key recovered from the sender signature, if the message was signed.
    pub fn from(&self) -> Option<&VerifyingKey> {
        self.from.as_ref()
    }

    /// Address of the signer, if the message was signed.
    pub fn from_address(&self) -> Option<Address> {
        self.from.as_ref().map(address_of)
    }

    pub fn to(&self) -> Option<&PublicKey> {
        self.to.as_ref()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn topics(&self) -> &[FullTopic] {
        &self.topics
    }
}

impl Envelope {
    /// Opens the envelope with one full topic per envelope topic position.
    ///
    /// Addressed envelopes additionally need the recipient secret key.
    pub fn open(
        &self,
        full_topics: &[FullTopic],
        recipient: Option<&SecretKey>,
    ) -> Result<Message, OpenError> {
        if full_topics.len() != self.topics.len() {
            return Err(OpenError::TopicCountMismatch {
                expected: self.topics.len(),
                supplied: full_topics.len(),
            });
        }
        for (position, (full, topic)) in full_topics.iter().zip(self.topics.iter()).enumerate() {
            if full.abridge() != *topic {
                return Err(OpenError::TopicMismatch { position });
            }
        }

        let (mode, rest) = self
            .data
            .split_first()
            .ok_or(OpenError::MalformedBody("empty data"))?;
        let mut topic_key = topic_key(full_topics);

        let opened = match *mode {
            MODE_BROADCAST => decrypt(&topic_key, rest).map(|body| (body, None)),
            MODE_ADDRESSED => {
                let secret = recipient.ok_or(OpenError::RecipientKeyRequired)?;
                if rest.len() < COMPRESSED_KEY_LEN {
                    return Err(OpenError::MalformedBody("truncated ephemeral key"));
                }
                let (ephemeral, sealed) = rest.split_at(COMPRESSED_KEY_LEN);
                let ephemeral = PublicKey::from_sec1_bytes(ephemeral)
                    .map_err(|_| OpenError::MalformedBody("invalid ephemeral key"))?;
                let shared = diffie_hellman(secret.to_nonzero_scalar(), ephemeral.as_affine());
                let mut key = addressed_key(shared.raw_secret_bytes().as_slice(), &topic_key);
                let body = decrypt(&key, sealed);
                key.zeroize();
                body.map(|b| (b, Some(secret.public_key())))
            }
            _ => Err(OpenError::MalformedBody("unknown mode")),
        };
        topic_key.zeroize();
        let (body, to) = opened?;

        let (flags, rest) = body
            .split_first()
            .ok_or(OpenError::MalformedBody("empty plaintext"))?;

        let (payload, from) = if flags & FLAG_SIGNED != 0 {
            if rest.len() < SIGNATURE_LEN {
                return Err(OpenError::MalformedBody("truncated signature"));
            }
            let (payload, sig) = rest.split_at(rest.len() - SIGNATURE_LEN);
            (payload, Some(recover_signer(payload, sig)?))
        } else {
            (rest, None)
        };

        Ok(Message {
            from,
            to,
            payload: payload.to_vec(),
            topics: full_topics.to_vec(),
        })
    }
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn topic_key(full_topics: &[FullTopic]) -> Hash {
    let mut material = Vec::with_capacity(full_topics.len() * 32);
    for topic in full_topics {
        material.extend_from_slice(topic.as_bytes());
    }
    let key = keccak256(&material);
    material.zeroize();
    key
}

fn addressed_key(shared: &[u8], topic_key: &Hash) -> Hash {
    let mut material = Vec::with_capacity(shared.len() + 32);
    material.extend_from_slice(shared);
    material.extend_from_slice(topic_key);
    let key = keccak256(&material);
    material.zeroize();
    key
}

fn encrypt(key: &Hash, plaintext: &[u8]) -> Result<Vec<u8>, SealError> {
    let cipher = XChaCha20Poly1305::new(key.into());
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| SealError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend(ciphertext);
    Ok(out)
}

fn decrypt(key: &Hash, sealed: &[u8]) -> Result<Vec<u8>, OpenError> {
    if sealed.len() < NONCE_LEN {
        return Err(OpenError::MalformedBody("truncated nonce"));
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    let cipher = XChaCha20Poly1305::new(key.into());
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| OpenError::DecryptionFailed)
}

fn recover_signer(payload: &[u8], sig: &[u8]) -> Result<VerifyingKey, OpenError> {
    let signature =
        Signature::from_slice(&sig[..64]).map_err(|_| OpenError::InvalidSignature)?;
    let recovery_id = RecoveryId::from_byte(sig[64]).ok_or(OpenError::InvalidSignature)?;
    VerifyingKey::recover_from_prehash(&keccak256(payload), &signature, recovery_id)
        .map_err(|_| OpenError::InvalidSignature)
}
