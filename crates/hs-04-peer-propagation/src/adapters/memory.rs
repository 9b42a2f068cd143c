//! # In-Memory Transport
//!
//! Connects hosts inside one process. Every direction of every link is an
//! unbounded channel drained by its own tokio task, so each connection is
//! processed independently of the others, as it would be over sockets.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use hs_02_message_pool::{MessagePool, PoolConfig};
use hs_03_watch_registry::WatchRegistry;
use shared_types::TimeSource;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::domain::{PeerId, PropagationConfig, PropagationError};
use crate::ports::inbound::PeerEvents;
use crate::ports::outbound::PeerNetwork;
use crate::service::HushHost;

/// One host's view of its in-memory links.
pub struct MemoryNetwork {
    local: PeerId,
    links: RwLock<HashMap<PeerId, UnboundedSender<Vec<u8>>>>,
}

impl MemoryNetwork {
    pub fn new(local: PeerId) -> Self {
        Self {
            local,
            links: RwLock::new(HashMap::new()),
        }
    }

    pub fn local_id(&self) -> PeerId {
        self.local
    }

    fn attach(&self, peer: PeerId, sender: UnboundedSender<Vec<u8>>) {
        self.links.write().insert(peer, sender);
    }

    /// Drops the outbound half of the link, which ends the remote reader.
    fn detach(&self, peer: &PeerId) -> bool {
        self.links.write().remove(peer).is_some()
    }

    pub fn is_linked(&self, peer: &PeerId) -> bool {
        self.links.read().contains_key(peer)
    }
}

impl PeerNetwork for MemoryNetwork {
    fn send(&self, peer: PeerId, packet: Vec<u8>) -> Result<(), PropagationError> {
        let links = self.links.read();
        let sender = links.get(&peer).ok_or(PropagationError::UnknownPeer(peer))?;
        sender
            .send(packet)
            .map_err(|_| PropagationError::PeerDisconnected(peer))
    }
}

/// A host wired to an in-memory network endpoint.
pub struct MemoryNode {
    id: PeerId,
    host: Arc<HushHost<MemoryNetwork>>,
    network: Arc<MemoryNetwork>,
}

impl MemoryNode {
    pub fn new(
        pool_config: PoolConfig,
        config: PropagationConfig,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let id = PeerId::random();
        let network = Arc::new(MemoryNetwork::new(id));
        let pool = Arc::new(MessagePool::new(pool_config, time));
        let host = Arc::new(HushHost::new(
            config,
            pool,
            Arc::new(WatchRegistry::new()),
            Arc::clone(&network),
        ));
        Self { id, host, network }
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn host(&self) -> &Arc<HushHost<MemoryNetwork>> {
        &self.host
    }

    /// Links two nodes in both directions. Must run inside a tokio runtime.
    ///
    /// Both hosts learn about each other before either reader starts, so
    /// nothing sent during connection setup is dropped.
    pub fn connect(&self, other: &MemoryNode) -> Link {
        let (to_other, from_self) = unbounded_channel();
        let (to_self, from_other) = unbounded_channel();
        self.network.attach(other.id, to_other);
        other.network.attach(self.id, to_self);

        self.host.on_connect(other.id);
        other.host.on_connect(self.id);

        let readers = [
            spawn_reader(from_self, other.host.clone(), self.id),
            spawn_reader(from_other, self.host.clone(), other.id),
        ];
        debug!(a = %self.id, b = %other.id, "memory link established");
        Link { readers }
    }

    /// Tears the link down. Packets still in flight are discarded by the
    /// receiving host.
    ///
    /// Only this call reports the disconnect to the hosts. The old readers
    /// drain and exit on their own, so a later `connect` between the same
    /// nodes is unaffected by them.
    pub fn disconnect(&self, other: &MemoryNode) {
        self.network.detach(&other.id);
        other.network.detach(&self.id);
        self.host.on_disconnect(other.id);
        other.host.on_disconnect(self.id);
    }

    pub fn is_connected_to(&self, other: &MemoryNode) -> bool {
        self.network.is_linked(&other.id)
    }
}

/// Reader tasks for the two directions of a link.
pub struct Link {
    readers: [JoinHandle<()>; 2],
}

impl Link {
    /// Waits for both directions to close after a disconnect.
    pub async fn closed(self) {
        for reader in self.readers {
            let _ = reader.await;
        }
    }
}

fn spawn_reader<E>(mut inbox: UnboundedReceiver<Vec<u8>>, host: Arc<E>, from: PeerId) -> JoinHandle<()>
where
    E: PeerEvents + 'static,
{
    tokio::spawn(async move {
        while let Some(packet) = inbox.recv().await {
            host.receive(from, &packet);
        }
        trace!(peer = %from, "memory link reader closed");
    })
}
