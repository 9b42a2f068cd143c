//! # Envelope Entity and Codec
//!
//! Canonical RLP form: `[expiry, ttl, [topics..], data, nonce]`.

use std::fmt;

use rlp::{Rlp, RlpStream};
use shared_types::{keccak256, short_hex, Hash, Timestamp};

use super::errors::{CodecError, SealError};
use super::topic::{Topic, Topics, MAX_TOPICS, TOPIC_LEN};

/// Number of RLP items in an encoded envelope.
const ENVELOPE_FIELDS: usize = 5;

/// The unit of gossip.
///
/// Immutable once shared; the only mutation is proof-of-work stamping of
/// `nonce`, which happens before the envelope leaves its creator.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    pub(crate) expiry: u32,
    pub(crate) ttl: u32,
    pub(crate) topics: Topics,
    pub(crate) data: Vec<u8>,
    pub(crate) nonce: u64,
}

impl Envelope {
    /// Creates an unstamped envelope that expires `ttl` seconds after `now`.
    ///
    /// Fails once `now + ttl` no longer fits the 32-bit expiry field.
    pub fn new(
        now: Timestamp,
        ttl: u32,
        topics: Topics,
        data: Vec<u8>,
    ) -> Result<Self, SealError> {
        let expiry = now
            .checked_add(u64::from(ttl))
            .and_then(|expiry| u32::try_from(expiry).ok())
            .ok_or(SealError::ExpiryOutOfRange { now, ttl })?;
        Ok(Self {
            expiry,
            ttl,
            topics,
            data,
            nonce: 0,
        })
    }

    /// Reassembles an envelope from already-validated parts.
    pub fn from_parts(expiry: u32, ttl: u32, topics: Topics, data: Vec<u8>, nonce: u64) -> Self {
        Self {
            expiry,
            ttl,
            topics,
            data,
            nonce,
        }
    }

    pub fn expiry(&self) -> u32 {
        self.expiry
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Moment the envelope was sealed, derived from `expiry - ttl`.
    pub fn sent(&self) -> Timestamp {
        self.expiry.saturating_sub(self.ttl) as Timestamp
    }

    /// An envelope is expired from its expiry second onwards.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expiry as Timestamp
    }

    /// Content identity: Keccak-256 of the canonical encoding.
    pub fn hash(&self) -> Hash {
        keccak256(&self.encode())
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut s = RlpStream::new();
        self.stream_rlp(&mut s, true);
        s.out().to_vec()
    }

    pub fn encoded_len(&self) -> usize {
        self.encode().len()
    }

    /// Appends this envelope to `s`, with or without the nonce.
    ///
    /// The nonce-less form is what proof-of-work commits to.
    pub fn stream_rlp(&self, s: &mut RlpStream, with_nonce: bool) {
        s.begin_list(if with_nonce {
            ENVELOPE_FIELDS
        } else {
            ENVELOPE_FIELDS - 1
        });
        s.append(&self.expiry);
        s.append(&self.ttl);
        s.begin_list(self.topics.len());
        for topic in &self.topics {
            s.append(&topic.0.as_slice());
        }
        s.append(&self.data);
        if with_nonce {
            s.append(&self.nonce);
        }
    }

    /// Decodes a complete envelope. Trailing bytes are an error.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let rlp = Rlp::new(bytes);
        let total = rlp.payload_info()?.total();
        if total != bytes.len() {
            return Err(CodecError::malformed(format!(
                "{} trailing bytes",
                bytes.len().saturating_sub(total)
            )));
        }
        Self::decode_rlp(&rlp)
    }

    /// Decodes an envelope from an item nested in a larger RLP structure.
    pub fn decode_rlp(rlp: &Rlp<'_>) -> Result<Self, CodecError> {
        if !rlp.is_list() {
            return Err(CodecError::malformed("envelope is not a list"));
        }
        let count = rlp.item_count()?;
        if count != ENVELOPE_FIELDS {
            return Err(CodecError::malformed(format!(
                "expected {} fields, found {}",
                ENVELOPE_FIELDS, count
            )));
        }

        let expiry: u32 = rlp.val_at(0)?;
        let ttl: u32 = rlp.val_at(1)?;

        let topic_list = rlp.at(2)?;
        if !topic_list.is_list() {
            return Err(CodecError::malformed("topics is not a list"));
        }
        let topic_count = topic_list.item_count()?;
        if topic_count > MAX_TOPICS {
            return Err(CodecError::malformed(format!(
                "{} topics exceeds maximum of {}",
                topic_count, MAX_TOPICS
            )));
        }
        let mut topics = Vec::with_capacity(topic_count);
        for item in topic_list.iter() {
            if !item.is_data() {
                return Err(CodecError::malformed("topic is not a byte string"));
            }
            let raw = item.data()?;
            if raw.len() != TOPIC_LEN {
                return Err(CodecError::malformed("topic must be 4 bytes"));
            }
            let mut topic = [0u8; TOPIC_LEN];
            topic.copy_from_slice(raw);
            topics.push(Topic(topic));
        }
        let topics =
            Topics::new(topics).map_err(|e| CodecError::malformed(e.to_string()))?;

        let data_item = rlp.at(3)?;
        if !data_item.is_data() {
            return Err(CodecError::malformed("data is not a byte string"));
        }
        let data: Vec<u8> = data_item.as_val()?;
        let nonce: u64 = rlp.val_at(4)?;

        Ok(Self {
            expiry,
            ttl,
            topics,
            data,
            nonce,
        })
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("expiry", &self.expiry)
            .field("ttl", &self.ttl)
            .field("topics", &self.topics)
            .field("data", &short_hex(&self.data))
            .field("nonce", &self.nonce)
            .finish()
    }
}
