//! # Proof of Work
//!
//! The work hash is `keccak256(seal_hash ‖ nonce_be)`, where `seal_hash` is
//! the Keccak-256 of the envelope encoded without its nonce. The amount of
//! work is the number of leading zero bits of that hash.
//!
//! Pool admission compares a score rather than raw bits:
//!
//! ```text
//! score = 2^work_bits × ttl / encoded_size
//! ```
//!
//! so envelopes that ask the network to hold more bytes for longer must
//! carry proportionally more work.

use std::time::{Duration, Instant};

use rlp::RlpStream;
use shared_types::{keccak256, Hash};
use tracing::trace;

use super::envelope::Envelope;

/// Nonces tried between clock reads during a search.
const NONCES_PER_ROUND: u64 = 1024;

/// Highest target accepted by [`Envelope::prove_work_bits`]. Reaching it
/// takes about 2^24 hashes.
pub const MAX_WORK_BITS: u32 = 24;

/// Count of leading zero bits in a hash.
pub fn leading_zero_bits(hash: &Hash) -> u32 {
    let mut bits = 0;
    for byte in hash {
        if *byte == 0 {
            bits += 8;
        } else {
            bits += byte.leading_zeros();
            break;
        }
    }
    bits
}

/// The target [`Envelope::prove_work_bits`] actually searches for.
pub fn clamp_work_bits(target_bits: u32) -> u32 {
    target_bits.min(MAX_WORK_BITS)
}

fn work_for(seal_hash: &Hash, nonce: u64) -> u32 {
    let mut buf = [0u8; 40];
    buf[..32].copy_from_slice(seal_hash);
    buf[32..].copy_from_slice(&nonce.to_be_bytes());
    leading_zero_bits(&keccak256(&buf))
}

impl Envelope {
    /// Hash of the envelope without its nonce.
    pub fn seal_hash(&self) -> Hash {
        let mut s = RlpStream::new();
        self.stream_rlp(&mut s, false);
        keccak256(&s.out())
    }

    /// Leading zero bits of the work hash for the current nonce.
    pub fn work_proved(&self) -> u32 {
        work_for(&self.seal_hash(), self.nonce)
    }

    /// Admission score for this envelope.
    pub fn pow_score(&self) -> f64 {
        let size = self.encoded_len().max(1) as f64;
        2f64.powi(self.work_proved() as i32) * self.ttl as f64 / size
    }

    /// Searches nonces for at most `budget`, keeping the best one found.
    ///
    /// At least one nonce is always evaluated, so a zero budget still stamps
    /// a valid (if weak) envelope. Returns the work bits achieved.
    pub fn prove_work(&mut self, budget: Duration) -> u32 {
        let seal = self.seal_hash();
        let started = Instant::now();

        let mut best_nonce = 0u64;
        let mut best_bits = work_for(&seal, 0);
        let mut nonce = 1u64;

        'search: while started.elapsed() < budget {
            for _ in 0..NONCES_PER_ROUND {
                let bits = work_for(&seal, nonce);
                if bits > best_bits {
                    best_bits = bits;
                    best_nonce = nonce;
                }
                nonce = match nonce.checked_add(1) {
                    Some(next) => next,
                    None => break 'search,
                };
            }
        }

        self.nonce = best_nonce;
        trace!(
            bits = best_bits,
            tried = nonce,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "proof of work complete"
        );
        best_bits
    }

    /// Searches until the work reaches `target_bits`.
    ///
    /// Targets above [`MAX_WORK_BITS`] are clamped to it, which bounds the
    /// search without a clock.
    pub fn prove_work_bits(&mut self, target_bits: u32) -> u32 {
        let target = clamp_work_bits(target_bits);
        let seal = self.seal_hash();
        let mut nonce = 0u64;
        loop {
            let bits = work_for(&seal, nonce);
            if bits >= target || nonce == u64::MAX {
                self.nonce = nonce;
                return bits;
            }
            nonce += 1;
        }
    }
}
