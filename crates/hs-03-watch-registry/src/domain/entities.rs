//! Watch entities.

use std::collections::HashSet;
use std::fmt;

use hs_01_envelope::TopicMask;
use shared_types::Hash;

/// Opaque handle returned by `install`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u64);

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered topic filter and the hashes waiting to be collected.
#[derive(Debug, Clone)]
pub struct Watch {
    mask: TopicMask,
    pending: Vec<Hash>,
    queued: HashSet<Hash>,
}

impl Watch {
    pub fn new(mask: TopicMask) -> Self {
        Self {
            mask,
            pending: Vec::new(),
            queued: HashSet::new(),
        }
    }

    pub fn mask(&self) -> &TopicMask {
        &self.mask
    }

    /// Queues `hash` unless it is already waiting. Returns whether it was added.
    pub fn push(&mut self, hash: Hash) -> bool {
        if self.queued.insert(hash) {
            self.pending.push(hash);
            true
        } else {
            false
        }
    }

    /// Takes every pending hash in arrival order.
    pub fn take_pending(&mut self) -> Vec<Hash> {
        self.queued.clear();
        std::mem::take(&mut self.pending)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
