//! # Message Pool
//!
//! ## Data Structures
//!
//! - `by_hash`: O(1) lookup of the shared envelope and its admission score
//! - `by_expiry`: ordered `(expiry, hash)` index for housekeeping sweeps
//!
//! Both indices live behind a single `RwLock` so readers never observe an
//! envelope present in one and absent from the other.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use hs_01_envelope::{Envelope, TopicMask};
use hush_telemetry::{metric_inc, ENVELOPES_ACCEPTED, ENVELOPES_REJECTED, POOL_SIZE};
use parking_lot::RwLock;
use shared_types::{short_hex, Hash, TimeSource, Timestamp};
use tracing::{debug, trace};

use super::entities::{InsertOutcome, PoolConfig, PoolStatus, RejectReason};
use super::errors::PoolError;

#[derive(Debug)]
struct PooledEnvelope {
    envelope: Arc<Envelope>,
    score: f64,
    size: usize,
}

#[derive(Debug, Default)]
struct PoolInner {
    by_hash: HashMap<Hash, PooledEnvelope>,
    by_expiry: BTreeSet<(u32, Hash)>,
    bytes: usize,
}

impl PoolInner {
    fn insert(&mut self, hash: Hash, pooled: PooledEnvelope) {
        self.by_expiry.insert((pooled.envelope.expiry(), hash));
        self.bytes += pooled.size;
        self.by_hash.insert(hash, pooled);
    }

    fn remove(&mut self, hash: &Hash) -> Option<PooledEnvelope> {
        let pooled = self.by_hash.remove(hash)?;
        self.by_expiry.remove(&(pooled.envelope.expiry(), *hash));
        self.bytes -= pooled.size;
        Some(pooled)
    }

    fn purge_expired(&mut self, now: Timestamp) -> usize {
        let expired: Vec<(u32, Hash)> = self
            .by_expiry
            .iter()
            .take_while(|(expiry, _)| (*expiry as Timestamp) <= now)
            .copied()
            .collect();
        for (_, hash) in &expired {
            self.remove(hash);
        }
        expired.len()
    }

    fn weakest(&self) -> Option<(Hash, f64)> {
        self.by_hash
            .iter()
            .map(|(hash, pooled)| (*hash, pooled.score))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Concurrent store of live envelopes.
pub struct MessagePool {
    config: PoolConfig,
    time: Arc<dyn TimeSource>,
    inner: RwLock<PoolInner>,
}

impl MessagePool {
    pub fn new(config: PoolConfig, time: Arc<dyn TimeSource>) -> Self {
        Self {
            config,
            time,
            inner: RwLock::new(PoolInner::default()),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Current time according to the pool's clock.
    pub fn now(&self) -> Timestamp {
        self.time.now()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().by_hash.is_empty()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.inner.read().by_hash.contains_key(hash)
    }

    /// Attempts to admit an envelope.
    ///
    /// A rejected envelope leaves the pool exactly as it was.
    pub fn insert(&self, envelope: Envelope) -> InsertOutcome {
        let hash = envelope.hash();
        let outcome = self.admit(hash, envelope);
        match &outcome {
            InsertOutcome::Accepted(_) => {
                metric_inc!(ENVELOPES_ACCEPTED);
                debug!(hash = %short_hex(&hash), "envelope accepted");
            }
            InsertOutcome::Rejected(reason) => {
                metric_inc!(ENVELOPES_REJECTED, &[reason.label()]);
                trace!(hash = %short_hex(&hash), ?reason, "envelope rejected");
            }
        }
        outcome
    }

    fn admit(&self, hash: Hash, envelope: Envelope) -> InsertOutcome {
        let now = self.time.now();

        if envelope.is_expired(now) {
            return InsertOutcome::Rejected(RejectReason::Expired);
        }
        if envelope.sent() > now.saturating_add(self.config.max_clock_skew_secs) {
            return InsertOutcome::Rejected(RejectReason::FromFuture);
        }

        // Cheap duplicate check before paying for the work hash.
        if self.contains(&hash) {
            return InsertOutcome::Rejected(RejectReason::Duplicate);
        }

        let score = envelope.pow_score();
        if score < self.config.min_pow {
            return InsertOutcome::Rejected(RejectReason::InsufficientWork {
                score,
                required: self.config.min_pow,
            });
        }

        let size = envelope.encoded_len();
        let mut inner = self.inner.write();
        if inner.by_hash.contains_key(&hash) {
            return InsertOutcome::Rejected(RejectReason::Duplicate);
        }

        if inner.by_hash.len() >= self.config.max_messages {
            inner.purge_expired(now);
        }
        if inner.by_hash.len() >= self.config.max_messages {
            match inner.weakest() {
                Some((victim, victim_score)) if victim_score < score => {
                    inner.remove(&victim);
                    debug!(
                        evicted = %short_hex(&victim),
                        victim_score,
                        score,
                        "evicted weakest envelope"
                    );
                }
                _ => return InsertOutcome::Rejected(RejectReason::PoolFull),
            }
        }

        inner.insert(
            hash,
            PooledEnvelope {
                envelope: Arc::new(envelope),
                score,
                size,
            },
        );
        POOL_SIZE.set(inner.by_hash.len() as f64);
        InsertOutcome::Accepted(hash)
    }

    /// Envelope by hash.
    ///
    /// Expired envelopes that housekeeping has not yet swept are still
    /// returned; callers that care check [`Envelope::is_expired`].
    pub fn lookup(&self, hash: &Hash) -> Result<Arc<Envelope>, PoolError> {
        self.inner
            .read()
            .by_hash
            .get(hash)
            .map(|pooled| Arc::clone(&pooled.envelope))
            .ok_or(PoolError::NotFound(*hash))
    }

    /// Live envelopes whose topics match `mask`, oldest expiry first.
    pub fn matching(&self, mask: &TopicMask) -> Vec<(Hash, Arc<Envelope>)> {
        let now = self.time.now();
        let inner = self.inner.read();
        inner
            .by_expiry
            .iter()
            .filter_map(|(_, hash)| inner.by_hash.get(hash).map(|p| (hash, p)))
            .filter(|(_, pooled)| {
                !pooled.envelope.is_expired(now) && mask.matches(pooled.envelope.topics())
            })
            .map(|(hash, pooled)| (*hash, Arc::clone(&pooled.envelope)))
            .collect()
    }

    /// Hashes of every envelope currently held.
    pub fn hashes(&self) -> Vec<Hash> {
        self.inner.read().by_hash.keys().copied().collect()
    }

    /// Removes expired envelopes. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.time.now();
        let mut inner = self.inner.write();
        let purged = inner.purge_expired(now);
        POOL_SIZE.set(inner.by_hash.len() as f64);
        if purged > 0 {
            debug!(purged, remaining = inner.by_hash.len(), "pool housekeeping");
        }
        purged
    }

    pub fn status(&self) -> PoolStatus {
        let inner = self.inner.read();
        PoolStatus {
            envelopes: inner.by_hash.len(),
            bytes: inner.bytes,
            capacity: self.config.max_messages,
            oldest_expiry: inner.by_expiry.iter().next().map(|(expiry, _)| *expiry),
        }
    }
}
