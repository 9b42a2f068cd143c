//! # Domain Entities
//!
//! - [`PeerId`]: 32-byte peer identifier assigned by the transport
//! - [`PeerState`]: what the engine knows about one connected peer
//! - [`PostRequest`]: everything needed to publish a message locally

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use k256::ecdsa::SigningKey;
use k256::PublicKey;
use parking_lot::Mutex;
use rand::RngCore;
use shared_types::Hash;

/// Unique identifier of a connected peer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub [u8; 32]);

impl PeerId {
    pub fn new(id: [u8; 32]) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        let mut id = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut id);
        Self(id)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self)
    }
}

/// Per-connection propagation state.
///
/// `known` holds every envelope hash received from, sent to, or queued for
/// the peer. It only grows for the life of the connection.
///
/// `send_gate` is held from taking the queue until the batch is handed to
/// the network, so batches for one peer leave in queue order.
#[derive(Debug, Default)]
pub struct PeerState {
    known: HashSet<Hash>,
    queue: VecDeque<Hash>,
    version: Option<u32>,
    send_gate: Arc<Mutex<()>>,
}

impl PeerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the peer already has `hash`.
    pub fn mark_known(&mut self, hash: Hash) {
        self.known.insert(hash);
    }

    pub fn knows(&self, hash: &Hash) -> bool {
        self.known.contains(hash)
    }

    /// Queues `hash` unless the peer already has it. Returns whether it was queued.
    pub fn enqueue(&mut self, hash: Hash) -> bool {
        if self.known.insert(hash) {
            self.queue.push_back(hash);
            true
        } else {
            false
        }
    }

    /// Takes the whole outbound queue in FIFO order.
    pub fn take_queue(&mut self) -> Vec<Hash> {
        self.queue.drain(..).collect()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = Some(version);
    }

    pub fn send_gate(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.send_gate)
    }
}

/// How much proof-of-work to spend on a posted envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkBudget {
    /// Search for the best nonce within this wall-clock budget.
    Time(Duration),
    /// Search until at least this many leading zero bits are reached.
    Bits(u32),
}

impl Default for WorkBudget {
    fn default() -> Self {
        Self::Time(Duration::from_millis(50))
    }
}

/// A local publish request.
#[derive(Clone)]
pub struct PostRequest {
    pub payload: Vec<u8>,
    pub topics: Vec<String>,
    pub ttl: u32,
    pub work: WorkBudget,
    pub from: Option<SigningKey>,
    pub to: Option<PublicKey>,
}

impl PostRequest {
    /// Default time-to-live in seconds.
    pub const DEFAULT_TTL: u32 = 50;

    pub fn new(payload: impl Into<Vec<u8>>, topics: &[&str]) -> Self {
        Self {
            payload: payload.into(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            ttl: Self::DEFAULT_TTL,
            work: WorkBudget::default(),
            from: None,
            to: None,
        }
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn work(mut self, work: WorkBudget) -> Self {
        self.work = work;
        self
    }

    pub fn signed_by(mut self, key: SigningKey) -> Self {
        self.from = Some(key);
        self
    }

    pub fn addressed_to(mut self, recipient: PublicKey) -> Self {
        self.to = Some(recipient);
        self
    }
}

impl fmt::Debug for PostRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostRequest")
            .field("payload_len", &self.payload.len())
            .field("topics", &self.topics)
            .field("ttl", &self.ttl)
            .field("work", &self.work)
            .field("signed", &self.from.is_some())
            .field("addressed", &self.to.is_some())
            .finish()
    }
}
