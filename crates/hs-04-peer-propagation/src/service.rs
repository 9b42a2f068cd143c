//! # Hush Host Service
//!
//! Ties the pool, the watch registry and the per-peer flooding state
//! together behind [`HushApi`] and [`PeerEvents`].
//!
//! ## Lock Order
//!
//! send gate → pool → watches → peers. The per-peer send gate is the only
//! lock held across a call into the [`PeerNetwork`] port; it is taken with
//! no other lock held.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use hs_01_envelope::{
    build_topic, Envelope, FullTopic, OutgoingMessage, TopicMask, MAX_WORK_BITS,
};
use hs_02_message_pool::{InsertOutcome, MessagePool};
use hs_03_watch_registry::{WatchId, WatchRegistry};
use hush_telemetry::{ENVELOPES_RELAYED, PEERS_CONNECTED};
use shared_types::{short_hex, Hash};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::domain::{
    HostError, HostStatus, Inbound, Packet, PeerId, PeerState, PostRequest, PropagationConfig,
    WorkBudget,
};
use crate::ports::inbound::{HushApi, PeerEvents};
use crate::ports::outbound::PeerNetwork;

/// A Hush node.
///
/// Thread-safe; share it across connection tasks via `Arc`.
pub struct HushHost<N: PeerNetwork> {
    config: PropagationConfig,
    pool: Arc<MessagePool>,
    watches: Arc<WatchRegistry>,
    peers: RwLock<HashMap<PeerId, PeerState>>,
    network: Arc<N>,
}

impl<N: PeerNetwork> HushHost<N> {
    pub fn new(
        config: PropagationConfig,
        pool: Arc<MessagePool>,
        watches: Arc<WatchRegistry>,
        network: Arc<N>,
    ) -> Self {
        Self {
            config,
            pool,
            watches,
            peers: RwLock::new(HashMap::new()),
            network,
        }
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<MessagePool> {
        &self.pool
    }

    pub fn watches(&self) -> &Arc<WatchRegistry> {
        &self.watches
    }

    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    pub fn peers(&self) -> Vec<PeerId> {
        self.peers.read().keys().copied().collect()
    }

    /// Whether `peer` is known to have (or to be about to receive) `hash`.
    pub fn peer_knows(&self, peer: &PeerId, hash: &Hash) -> bool {
        self.peers
            .read()
            .get(peer)
            .map_or(false, |state| state.knows(hash))
    }

    /// Protocol version the peer announced, once its status packet arrived.
    pub fn peer_version(&self, peer: &PeerId) -> Option<u32> {
        self.peers.read().get(peer).and_then(PeerState::version)
    }

    pub fn status(&self) -> HostStatus {
        let pooled_envelopes = self.pool.len();
        let watches = self.watches.watch_count();
        let peers = self.peers.read();
        HostStatus {
            peers: peers.len(),
            pooled_envelopes,
            watches,
            queued_envelopes: peers.values().map(PeerState::queued).sum(),
        }
    }

    // =========================================================================
    // ADMISSION AND FLOODING
    // =========================================================================

    /// Offers an envelope to the pool and, if accepted, to watches and peers.
    ///
    /// `source` is the peer it arrived from, or `None` for local posts.
    /// Does not flush; callers decide when queued envelopes go out.
    pub fn inject(&self, envelope: Envelope, source: Option<PeerId>) -> InsertOutcome {
        let hash = envelope.hash();
        let topics = envelope.topics().clone();
        let outcome = self.pool.insert(envelope);

        match &outcome {
            InsertOutcome::Accepted(_) => {
                self.watches.notify(&hash, &topics);
                self.note_accepted(hash, source);
            }
            InsertOutcome::Rejected(reason) => {
                if let Some(peer) = source {
                    trace!(peer = %peer, hash = %short_hex(&hash), ?reason, "dropped envelope from peer");
                    // Whatever the reason, the sender evidently has it.
                    if let Some(state) = self.peers.write().get_mut(&peer) {
                        state.mark_known(hash);
                    }
                }
            }
        }
        outcome
    }

    /// Marks `hash` known for its source and queues it for every other peer.
    pub fn note_accepted(&self, hash: Hash, source: Option<PeerId>) {
        let mut peers = self.peers.write();
        let mut queued = 0usize;
        for (peer, state) in peers.iter_mut() {
            if Some(*peer) == source {
                state.mark_known(hash);
            } else if state.enqueue(hash) {
                queued += 1;
            }
        }
        trace!(hash = %short_hex(&hash), queued, "envelope queued for peers");
    }

    /// Sends everything queued for `peer`. Returns the number of envelopes sent.
    ///
    /// Concurrent flushes of the same peer are serialized, so envelopes reach
    /// it in the order they were queued.
    pub fn flush(&self, peer: PeerId) -> usize {
        let gate = match self.peers.read().get(&peer) {
            Some(state) => state.send_gate(),
            None => return 0,
        };
        let _sending = gate.lock();

        let pending = match self.peers.write().get_mut(&peer) {
            Some(state) => state.take_queue(),
            None => return 0,
        };
        if pending.is_empty() {
            return 0;
        }

        let now = self.pool.now();
        let envelopes: Vec<Arc<Envelope>> = pending
            .iter()
            .filter_map(|hash| self.pool.lookup(hash).ok())
            .filter(|envelope| !envelope.is_expired(now))
            .collect();

        let mut sent = 0;
        for batch in envelopes.chunks(self.config.max_batch.max(1)) {
            let packet = Packet::Messages(batch.to_vec());
            if let Err(err) = self.network.send(peer, packet.encode()) {
                debug!(peer = %peer, error = %err, "send failed, dropping batch");
                break;
            }
            sent += batch.len();
        }
        if sent > 0 {
            ENVELOPES_RELAYED.inc_by(sent as f64);
            trace!(peer = %peer, sent, "flushed envelopes");
        }
        sent
    }

    /// Flushes every peer's queue.
    pub fn flush_all(&self) -> usize {
        self.peers().into_iter().map(|peer| self.flush(peer)).sum()
    }

    /// Removes expired envelopes from the pool.
    pub fn housekeeping(&self) -> usize {
        self.pool.purge_expired()
    }

    fn send_status(&self, peer: PeerId) {
        let packet = Packet::Status {
            version: self.config.protocol_version,
        };
        if let Err(err) = self.network.send(peer, packet.encode()) {
            debug!(peer = %peer, error = %err, "status send failed");
        }
    }

    fn note_status(&self, peer: PeerId, version: u32) {
        if version != self.config.protocol_version {
            warn!(
                peer = %peer,
                version,
                expected = self.config.protocol_version,
                "peer speaks a different protocol version"
            );
        }
        if let Some(state) = self.peers.write().get_mut(&peer) {
            state.set_version(version);
        }
    }

    fn stamp(envelope: &mut Envelope, work: WorkBudget) -> u32 {
        match work {
            WorkBudget::Time(budget) => envelope.prove_work(budget),
            WorkBudget::Bits(bits) => envelope.prove_work_bits(bits),
        }
    }
}

impl<N: PeerNetwork + 'static> HushHost<N> {
    /// Runs [`HushHost::housekeeping`] on the configured interval until the
    /// returned task is aborted.
    pub fn spawn_housekeeping(self: &Arc<Self>) -> JoinHandle<()> {
        let host = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(host.config.housekeeping_interval);
            loop {
                ticker.tick().await;
                host.housekeeping();
            }
        })
    }
}

impl<N: PeerNetwork> HushApi for HushHost<N> {
    fn post(&self, request: PostRequest) -> Result<Hash, HostError> {
        if let WorkBudget::Bits(requested) = request.work {
            if requested > MAX_WORK_BITS {
                return Err(HostError::WorkTargetTooHigh {
                    requested,
                    max: MAX_WORK_BITS,
                });
            }
        }
        let topic_strs: Vec<&str> = request.topics.iter().map(String::as_str).collect();
        let (_, full_topics) = build_topic(&topic_strs)?;

        let mut message = OutgoingMessage::new(request.payload);
        if let Some(key) = request.from {
            message = message.signed_by(key);
        }
        if let Some(recipient) = request.to {
            message = message.addressed_to(recipient);
        }

        let mut envelope = message.seal(&full_topics, request.ttl, self.pool.now())?;
        let bits = Self::stamp(&mut envelope, request.work);

        match self.inject(envelope, None) {
            InsertOutcome::Accepted(hash) => {
                debug!(hash = %short_hex(&hash), bits, "posted envelope");
                self.flush_all();
                Ok(hash)
            }
            InsertOutcome::Rejected(reason) => Err(HostError::Rejected(reason)),
        }
    }

    fn install_watch(&self, mask: TopicMask) -> WatchId {
        self.watches.install(mask)
    }

    fn uninstall_watch(&self, id: WatchId) -> Result<(), HostError> {
        Ok(self.watches.uninstall(id)?)
    }

    fn check_watch(&self, id: WatchId) -> Result<Vec<Hash>, HostError> {
        Ok(self.watches.drain(id)?)
    }

    fn envelope(&self, hash: &Hash) -> Result<Arc<Envelope>, HostError> {
        Ok(self.pool.lookup(hash)?)
    }

    fn full_topics(&self, id: WatchId) -> Result<Vec<FullTopic>, HostError> {
        Ok(self.watches.full_topics(id)?)
    }

    fn messages(&self, id: WatchId) -> Result<Vec<Hash>, HostError> {
        let mask = self.watches.mask(id)?;
        Ok(self
            .pool
            .matching(&mask)
            .into_iter()
            .map(|(hash, _)| hash)
            .collect())
    }
}

impl<N: PeerNetwork> PeerEvents for HushHost<N> {
    fn on_connect(&self, peer: PeerId) {
        {
            let mut peers = self.peers.write();
            if peers.contains_key(&peer) {
                return;
            }
            peers.insert(peer, PeerState::new());
            PEERS_CONNECTED.set(peers.len() as f64);
        }
        info!(peer = %peer, "peer connected");
        self.send_status(peer);

        if self.config.sync_on_connect {
            let live = self.pool.hashes();
            if let Some(state) = self.peers.write().get_mut(&peer) {
                for hash in live {
                    state.enqueue(hash);
                }
            }
            self.flush(peer);
        }
    }

    fn on_disconnect(&self, peer: PeerId) {
        let mut peers = self.peers.write();
        if let Some(state) = peers.remove(&peer) {
            PEERS_CONNECTED.set(peers.len() as f64);
            info!(
                peer = %peer,
                known = state.known_count(),
                dropped = state.queued(),
                "peer disconnected"
            );
        }
    }

    fn receive(&self, peer: PeerId, packet: &[u8]) {
        if !self.peers.read().contains_key(&peer) {
            debug!(peer = %peer, "packet from unconnected peer dropped");
            return;
        }

        match Packet::decode(packet) {
            Err(err) => warn!(peer = %peer, error = %err, "malformed packet dropped"),
            Ok(Inbound::Status { version }) => self.note_status(peer, version),
            Ok(Inbound::Messages(items)) => {
                for item in items {
                    match item {
                        Ok(envelope) => {
                            self.inject(envelope, Some(peer));
                        }
                        Err(err) => {
                            warn!(peer = %peer, error = %err, "malformed envelope dropped")
                        }
                    }
                }
                self.flush_all();
            }
        }
    }
}
