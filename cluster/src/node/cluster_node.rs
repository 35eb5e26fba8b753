use std::collections::HashMap;

use log::{debug, info};

use arbor_shared::{Identity, PeerAddress};

use crate::{config::ClusterConfig, error::ClusterError, network::NodeRef, world::EntityKey};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeState {
    Idle,
    ConnectingToCluster,
    Ready,
}

/// One participant of the cluster as this process knows it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterPeer {
    pub id: Identity,
    /// Address the peer accepts sessions on. None for peers only reachable
    /// through the session they opened to us.
    pub advertise: Option<PeerAddress>,
    /// Route to the peer. Local for this process, None once its session closed.
    pub node: Option<NodeRef>,
}

/// Roster of the cluster and the state of this process's membership
pub struct ClusterNode {
    config: ClusterConfig,
    state: NodeState,
    peers: Vec<ClusterPeer>,
    index: HashMap<Identity, usize>,
    by_node: HashMap<NodeRef, Identity>,
    manager: Option<EntityKey>,
    root_object: Option<EntityKey>,
}

impl ClusterNode {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            state: NodeState::Idle,
            peers: Vec::new(),
            index: HashMap::new(),
            by_node: HashMap::new(),
            manager: None,
            root_object: None,
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == NodeState::Ready
    }

    /// Known peers, root first, then in the order they joined
    pub fn peers(&self) -> &[ClusterPeer] {
        &self.peers
    }

    pub fn peer(&self, peer_id: &Identity) -> Option<&ClusterPeer> {
        self.index.get(peer_id).map(|index| &self.peers[*index])
    }

    /// Peer reachable through `node`
    pub fn peer_at(&self, node: NodeRef) -> Option<Identity> {
        self.by_node.get(&node).copied()
    }

    /// Route to the process `peer_id`
    pub fn route(&self, peer_id: &Identity) -> Result<NodeRef, ClusterError> {
        self.peer(peer_id)
            .and_then(|peer| peer.node)
            .ok_or(ClusterError::UnknownPeer { peer_id: *peer_id })
    }

    /// Entity holding the cluster object manager
    pub fn manager(&self) -> Option<EntityKey> {
        self.manager
    }

    /// Entity of the root cluster object
    pub fn root_object(&self) -> Option<EntityKey> {
        self.root_object
    }

    pub(crate) fn set_state(&mut self, state: NodeState) {
        debug!("Cluster node state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub(crate) fn set_roots(&mut self, manager: EntityKey, root_object: EntityKey) {
        self.manager = Some(manager);
        self.root_object = Some(root_object);
    }

    /// Records a peer, or refreshes how to reach one already known
    pub(crate) fn add_peer(
        &mut self,
        id: Identity,
        advertise: Option<PeerAddress>,
        node: Option<NodeRef>,
    ) {
        if let Some(node) = node {
            self.by_node.insert(node, id);
        }
        match self.index.get(&id) {
            Some(index) => {
                let peer = &mut self.peers[*index];
                if advertise.is_some() {
                    peer.advertise = advertise;
                }
                if node.is_some() {
                    peer.node = node;
                }
            }
            None => {
                info!("Cluster peer {} added ({:?})", id, node);
                self.index.insert(id, self.peers.len());
                self.peers.push(ClusterPeer {
                    id,
                    advertise,
                    node,
                });
            }
        }
    }

    /// Marks the peer behind `node` unreachable. It stays in the roster.
    pub(crate) fn forget_node(&mut self, node: NodeRef) -> Option<Identity> {
        let id = self.by_node.remove(&node)?;
        if let Some(index) = self.index.get(&id) {
            let peer = &mut self.peers[*index];
            if peer.node == Some(node) {
                peer.node = None;
            }
        }
        info!("Cluster peer {} is no longer reachable", id);
        Some(id)
    }
}
