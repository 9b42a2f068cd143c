//! # Watch Registry
//!
//! A single mutex guards every watch: `notify` appends and `drain`
//! swap-and-clears under the same lock, so a hash is reported by exactly
//! one drain.

use std::collections::HashMap;

use hs_01_envelope::{FullTopic, TopicMask, Topics};
use hush_telemetry::WATCHES_NOTIFIED;
use parking_lot::Mutex;
use shared_types::{short_hex, Hash};
use tracing::{debug, trace};

use crate::domain::{Watch, WatchError, WatchId};

#[derive(Debug, Default)]
struct RegistryInner {
    watches: HashMap<WatchId, Watch>,
    next_id: u64,
}

#[derive(Debug, Default)]
pub struct WatchRegistry {
    inner: Mutex<RegistryInner>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, mask: TopicMask) -> WatchId {
        let mut inner = self.inner.lock();
        let id = WatchId(inner.next_id);
        inner.next_id += 1;
        inner.watches.insert(id, Watch::new(mask));
        debug!(watch = %id, "watch installed");
        id
    }

    pub fn uninstall(&self, id: WatchId) -> Result<(), WatchError> {
        if self.inner.lock().watches.remove(&id).is_none() {
            return Err(WatchError::NoSuchWatch(id));
        }
        debug!(watch = %id, "watch removed");
        Ok(())
    }

    /// Offers an admitted envelope to every watch. Returns how many watches
    /// queued it.
    pub fn notify(&self, hash: &Hash, topics: &Topics) -> usize {
        let mut inner = self.inner.lock();
        let mut hits = 0;
        for (id, watch) in inner.watches.iter_mut() {
            if watch.mask().matches(topics) && watch.push(*hash) {
                trace!(watch = %id, hash = %short_hex(hash), "watch notified");
                hits += 1;
            }
        }
        if hits > 0 {
            WATCHES_NOTIFIED.inc_by(hits as f64);
        }
        hits
    }

    /// Pending hashes in arrival order; the pending set is left empty.
    pub fn drain(&self, id: WatchId) -> Result<Vec<Hash>, WatchError> {
        self.inner
            .lock()
            .watches
            .get_mut(&id)
            .map(Watch::take_pending)
            .ok_or(WatchError::NoSuchWatch(id))
    }

    pub fn mask(&self, id: WatchId) -> Result<TopicMask, WatchError> {
        self.inner
            .lock()
            .watches
            .get(&id)
            .map(|w| w.mask().clone())
            .ok_or(WatchError::NoSuchWatch(id))
    }

    /// Full topics the watch was installed with; what `Envelope::open` needs.
    pub fn full_topics(&self, id: WatchId) -> Result<Vec<FullTopic>, WatchError> {
        self.mask(id).map(|mask| mask.full_topics())
    }

    pub fn watch_count(&self) -> usize {
        self.inner.lock().watches.len()
    }
}
