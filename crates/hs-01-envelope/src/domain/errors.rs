//! # Envelope Errors

use shared_types::Timestamp;
use thiserror::Error;

/// Failure to decode an envelope from its wire form.
///
/// Decoding is all-or-nothing: no partially decoded envelope is ever
/// returned alongside this error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed envelope encoding: {reason}")]
    MalformedEncoding { reason: String },
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEncoding {
            reason: reason.into(),
        }
    }
}

impl From<rlp::DecoderError> for CodecError {
    fn from(err: rlp::DecoderError) -> Self {
        Self::malformed(err.to_string())
    }
}

/// Topic list construction errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopicError {
    #[error("Too many topics: {count} (max {max})")]
    TooManyTopics { count: usize, max: usize },
}

/// Errors while sealing a payload into an envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SealError {
    #[error(transparent)]
    Topic(#[from] TopicError),

    #[error("Signing failed")]
    SigningFailed,

    #[error("Encryption failed")]
    EncryptionFailed,

    /// `now + ttl` does not fit the 32-bit expiry field (past early 2106).
    #[error("Expiry {now} + {ttl} exceeds the 32-bit timestamp range")]
    ExpiryOutOfRange { now: Timestamp, ttl: u32 },
}

/// Errors while opening an envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OpenError {
    /// The caller must supply one full topic per envelope topic.
    #[error("Topic count mismatch: envelope has {expected}, supplied {supplied}")]
    TopicCountMismatch { expected: usize, supplied: usize },

    /// A supplied full topic does not abridge to the envelope topic at the
    /// same position.
    #[error("Full topic at position {position} does not match the envelope")]
    TopicMismatch { position: usize },

    #[error("Envelope is addressed to a recipient; a secret key is required")]
    RecipientKeyRequired,

    #[error("Malformed message body: {0}")]
    MalformedBody(&'static str),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Invalid sender signature")]
    InvalidSignature,
}
