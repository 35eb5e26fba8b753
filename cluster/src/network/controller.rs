use std::collections::BTreeMap;

use log::{debug, info, warn};

use arbor_client::{self as client, ClientSession};
use arbor_server::{self as server, PeerKey, ServerSession};
use arbor_shared::{
    transport::Transport, ConnectionConfig, EntityMessageEvent, ExecKind, Identity,
    IdentityAllocator, Message, MessageKind, MessageKinds, NetworkEvent, PeerAddress,
    PeerIdentityAllocator, Protocol, RequestError, ResponseEvent, ResponseId, ResponseSlot,
    RpcEvent, RpcParam, SyncEvent, Tick,
};

use crate::{
    error::ClusterError,
    messages::{PeerIdResponse, RegisterPeerId, RequestPeerId},
    network::{
        inbound::Inbound,
        loopback::Loopback,
        node_ref::{ClientKey, NodeRef, ServerKey},
    },
    process::ProcessEvent,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClientRole {
    /// Session to the root, used to obtain this process's identity
    Parent,
    /// Session to another node, announced with the identity we already have
    Sibling,
}

struct ClientState {
    session: ClientSession,
    role: ClientRole,
    remote_peer_id: Identity,
    handshake: Option<ResponseSlot>,
    authorized: bool,
}

/// Owns every session of a process, the loopback, and the identity
/// allocators. Routes outgoing messages by `NodeRef` and turns inbound
/// traffic into `Inbound` messages and `ProcessEvent`s.
pub struct NetworkController {
    transport: Box<dyn Transport>,
    config: ConnectionConfig,
    message_kinds: MessageKinds,
    peer_id: Option<Identity>,
    is_root: bool,
    identities: IdentityAllocator,
    peer_identities: PeerIdentityAllocator,
    servers: BTreeMap<ServerKey, ServerSession>,
    clients: BTreeMap<ClientKey, ClientState>,
    next_server: u16,
    next_client: u16,
    default_server: Option<ServerKey>,
    parent_client: Option<ClientKey>,
    loopback: Loopback,
    tick: Tick,
}

impl NetworkController {
    pub fn new(transport: Box<dyn Transport>, protocol: &Protocol) -> Self {
        Self {
            transport,
            config: protocol.connection.clone(),
            message_kinds: protocol.message_kinds.clone(),
            peer_id: None,
            is_root: false,
            identities: IdentityAllocator::new(),
            peer_identities: PeerIdentityAllocator::new(),
            servers: BTreeMap::new(),
            clients: BTreeMap::new(),
            next_server: 0,
            next_client: 0,
            default_server: None,
            parent_client: None,
            loopback: Loopback::default(),
            tick: 0,
        }
    }

    // Identity

    pub fn peer_id(&self) -> Option<Identity> {
        self.peer_id
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Mints a new identity owned by this process
    pub fn new_identity(&mut self) -> Result<Identity, ClusterError> {
        let peer_id = self.peer_id.ok_or(ClusterError::NotReady)?;
        Ok(self.identities.next_under(&peer_id)?)
    }

    /// Mints a new identity directly below `parent`
    pub fn new_identity_under(&mut self, parent: &Identity) -> Result<Identity, ClusterError> {
        if self.peer_id.is_none() {
            return Err(ClusterError::NotReady);
        }
        Ok(self.identities.next_under(parent)?)
    }

    /// Identity of the process at the other end of `node`, once known
    pub fn node_peer_id(&self, node: NodeRef) -> Option<Identity> {
        match node {
            NodeRef::Local => self.peer_id,
            NodeRef::Client(key) => self
                .clients
                .get(&key)
                .filter(|client| client.authorized)
                .map(|client| client.remote_peer_id),
            NodeRef::Peer(server, peer) => self
                .servers
                .get(&server)
                .and_then(|session| session.peer_id(&peer)),
        }
    }

    /// Gives the peer behind `origin` a fresh identity below ours
    pub(crate) fn assign_peer_id(&mut self, origin: NodeRef) -> Result<Identity, ClusterError> {
        let host = self.peer_id.ok_or(ClusterError::NotReady)?;
        let NodeRef::Peer(server, peer) = origin else {
            return Err(ClusterError::UnknownNode { node: origin });
        };
        let session = self
            .servers
            .get_mut(&server)
            .ok_or(ClusterError::UnknownNode { node: origin })?;
        let peer_id = self.peer_identities.next_peer(&host)?;
        session.set_peer_id(&peer, peer_id)?;
        Ok(peer_id)
    }

    /// Records the identity a peer announced for itself
    pub(crate) fn register_peer_id(
        &mut self,
        origin: NodeRef,
        peer_id: Identity,
    ) -> Result<(), ClusterError> {
        let NodeRef::Peer(server, peer) = origin else {
            return Err(ClusterError::UnknownNode { node: origin });
        };
        let session = self
            .servers
            .get_mut(&server)
            .ok_or(ClusterError::UnknownNode { node: origin })?;
        session.set_peer_id(&peer, peer_id)?;
        Ok(())
    }

    // Sessions

    /// Takes the root identity and starts the default server session
    pub fn host_root(&mut self, address: &PeerAddress) -> Result<ServerKey, ClusterError> {
        if self.peer_id.is_some() || self.default_server.is_some() {
            return Err(ClusterError::AlreadyStarted);
        }
        let key = self.listen(address)?;
        self.peer_id = Some(Identity::ROOT);
        self.is_root = true;
        info!("Hosting cluster root at {}", address);
        Ok(key)
    }

    /// Opens a server session. The first one becomes the default session
    /// RPC and state broadcasts go out on.
    pub fn listen(&mut self, address: &PeerAddress) -> Result<ServerKey, ClusterError> {
        let session = ServerSession::listen(self.transport.as_mut(), address, &self.config)?;
        let key = ServerKey(self.next_server);
        self.next_server += 1;
        self.servers.insert(key, session);
        if self.default_server.is_none() {
            self.default_server = Some(key);
        }
        Ok(key)
    }

    /// Connects to the root. The session asks for this process's identity
    /// as soon as it is up.
    pub fn connect_parent(&mut self, address: &PeerAddress) -> Result<ClientKey, ClusterError> {
        if self.parent_client.is_some() || self.peer_id.is_some() {
            return Err(ClusterError::AlreadyStarted);
        }
        let key = self.open_client(address, ClientRole::Parent, Identity::ROOT)?;
        self.parent_client = Some(key);
        Ok(key)
    }

    /// Connects to another node whose identity is already known
    pub fn connect_sibling(
        &mut self,
        address: &PeerAddress,
        remote_peer_id: Identity,
    ) -> Result<ClientKey, ClusterError> {
        if self.peer_id.is_none() {
            return Err(ClusterError::NotReady);
        }
        self.open_client(address, ClientRole::Sibling, remote_peer_id)
    }

    fn open_client(
        &mut self,
        address: &PeerAddress,
        role: ClientRole,
        remote_peer_id: Identity,
    ) -> Result<ClientKey, ClusterError> {
        let session = ClientSession::connect(self.transport.as_mut(), address, &self.config)?;
        let key = ClientKey(self.next_client);
        self.next_client += 1;
        self.clients.insert(
            key,
            ClientState {
                session,
                role,
                remote_peer_id,
                handshake: None,
                authorized: false,
            },
        );
        Ok(key)
    }

    pub fn default_server(&self) -> Option<ServerKey> {
        self.default_server
    }

    pub fn parent_client(&self) -> Option<ClientKey> {
        self.parent_client
    }

    pub fn is_connected(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::Local => true,
            NodeRef::Client(key) => self
                .clients
                .get(&key)
                .map(|client| client.session.is_connected())
                .unwrap_or(false),
            NodeRef::Peer(server, peer) => self
                .servers
                .get(&server)
                .and_then(|session| session.peer(&peer))
                .map(|peer| peer.is_connected())
                .unwrap_or(false),
        }
    }

    /// Peers currently connected to a server session
    pub fn server_peers(&self, server: ServerKey) -> Vec<PeerKey> {
        self.servers
            .get(&server)
            .map(|session| session.peer_keys())
            .unwrap_or_default()
    }

    pub fn clients(&self) -> Vec<ClientKey> {
        self.clients.keys().copied().collect()
    }

    /// Closes the link behind `node`. The disconnection surfaces in the
    /// next read phase.
    pub fn disconnect(&mut self, node: NodeRef) {
        match node {
            NodeRef::Local => {}
            NodeRef::Client(key) => {
                if let Some(client) = self.clients.get_mut(&key) {
                    client.session.disconnect();
                }
            }
            NodeRef::Peer(server, peer) => {
                if let Some(session) = self.servers.get_mut(&server) {
                    session.disconnect(&peer);
                }
            }
        }
    }

    // Tick phases

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) -> Tick {
        self.tick += 1;
        self.tick
    }

    /// Reads every session and the loopback. Entity messages are returned
    /// for dispatch, everything else becomes a process event.
    pub(crate) fn read_phase(&mut self, events: &mut Vec<ProcessEvent>) -> Vec<Inbound> {
        let mut inbound = Vec::new();

        for (server_key, session) in self.servers.iter_mut() {
            let mut received = session.receive();
            for peer in received.read::<server::ConnectEvent>() {
                debug!("Peer {:?} connected to server {:?}", peer, server_key);
            }
            for (peer, event) in received.read::<server::NetworkEventReceived>() {
                let origin = NodeRef::Peer(*server_key, peer);
                classify(&self.message_kinds, origin, event, events, &mut inbound);
            }
            for (peer, peer_id) in received.read::<server::DisconnectEvent>() {
                events.push(ProcessEvent::PeerDisconnected {
                    node: NodeRef::Peer(*server_key, peer),
                    peer_id,
                });
            }
            for error in received.read::<server::ErrorEvent>() {
                warn!("Server session {:?}: {}", server_key, error);
            }
        }

        let mut connected = Vec::new();
        for (client_key, client) in self.clients.iter_mut() {
            let mut received = client.session.receive();
            if received.has::<client::ConnectEvent>() {
                connected.push(*client_key);
                events.push(ProcessEvent::ConnectedToServer { client: *client_key });
            }
            for event in received.read::<client::NetworkEventReceived>() {
                let origin = NodeRef::Client(*client_key);
                classify(&self.message_kinds, origin, event, events, &mut inbound);
            }
            if received.has::<client::DisconnectEvent>() {
                events.push(ProcessEvent::DisconnectedFromServer { client: *client_key });
            }
            for error in received.read::<client::ErrorEvent>() {
                warn!("Client session {:?}: {}", client_key, error);
            }
        }

        for event in self.loopback.receive() {
            classify(&self.message_kinds, NodeRef::Local, event, events, &mut inbound);
        }

        for client_key in connected {
            if let Err(error) = self.start_handshake(client_key) {
                warn!("Could not start handshake on {:?}: {}", client_key, error);
            }
        }

        inbound
    }

    fn start_handshake(&mut self, key: ClientKey) -> Result<(), ClusterError> {
        let role = self
            .clients
            .get(&key)
            .map(|client| client.role)
            .ok_or(ClusterError::UnknownNode {
                node: NodeRef::Client(key),
            })?;
        let node = NodeRef::Client(key);
        let slot = match role {
            ClientRole::Parent => self.send_request(node, Identity::ROOT, &RequestPeerId)?,
            ClientRole::Sibling => {
                let peer_id = self.peer_id.ok_or(ClusterError::NotReady)?;
                self.send_request(node, Identity::ROOT, &RegisterPeerId { peer_id })?
            }
        };
        if let Some(client) = self.clients.get_mut(&key) {
            client.handshake = Some(slot);
        }
        Ok(())
    }

    /// Completes identity handshakes whose response has arrived
    pub(crate) fn poll_handshakes(&mut self, events: &mut Vec<ProcessEvent>) {
        for (key, client) in self.clients.iter_mut() {
            let Some(result) = client.handshake.as_ref().and_then(|slot| slot.take()) else {
                continue;
            };
            client.handshake = None;
            let response = match result.and_then(|envelope| envelope.read::<PeerIdResponse>()) {
                Ok(response) => response,
                Err(error) => {
                    warn!("Identity handshake on {:?} failed: {}", key, error);
                    continue;
                }
            };
            match client.role {
                ClientRole::Parent => {
                    info!("Authorized by the root as {}", response.peer_id);
                    self.peer_id = Some(response.peer_id);
                }
                ClientRole::Sibling => {
                    if Some(response.peer_id) != self.peer_id {
                        warn!(
                            "Peer {} registered us as {}, expected {:?}",
                            client.remote_peer_id, response.peer_id, self.peer_id
                        );
                    }
                }
            }
            client.authorized = true;
            events.push(ProcessEvent::AuthorizedFromServer {
                client: *key,
                peer_id: response.peer_id,
            });
        }
    }

    /// Fails requests that have waited `timeout` ticks or longer on any session
    pub(crate) fn expire_requests(&mut self, timeout: Tick) -> usize {
        let now = self.tick;
        let mut expired = self.loopback.expire_requests(now, timeout);
        for session in self.servers.values_mut() {
            expired += session.expire_requests(now, timeout);
        }
        for client in self.clients.values_mut() {
            expired += client.session.expire_requests(now, timeout);
        }
        expired
    }

    pub fn pending_requests(&self) -> usize {
        self.loopback.pending_requests()
            + self
                .servers
                .values()
                .map(|session| session.pending_requests())
                .sum::<usize>()
            + self
                .clients
                .values()
                .map(|client| client.session.pending_requests())
                .sum::<usize>()
    }

    pub(crate) fn write_phase(&mut self) {
        for session in self.servers.values_mut() {
            session.send_all();
        }
        for client in self.clients.values_mut() {
            client.session.send_all();
        }
    }

    // Sending

    /// Sends a correlated entity message to `target` on `node`. The returned
    /// slot resolves with the response, or with an error if the session
    /// closes or the request times out.
    pub fn send_request<M: Message>(
        &mut self,
        node: NodeRef,
        target: Identity,
        message: &M,
    ) -> Result<ResponseSlot, ClusterError> {
        self.send_tracked_request(node, target, message)
            .map(|(_, slot)| slot)
    }

    /// Like `send_request`, also returning the id the request went out with
    /// on `node`'s session
    pub fn send_tracked_request<M: Message>(
        &mut self,
        node: NodeRef,
        target: Identity,
        message: &M,
    ) -> Result<(ResponseId, ResponseSlot), ClusterError> {
        self.check_registered(M::KIND)?;
        let slot = ResponseSlot::new();
        let payload = message.to_payload();
        let now = self.tick;
        let response_id = match node {
            NodeRef::Local => {
                self.loopback
                    .send_request(target, M::KIND, payload, slot.clone(), now)?
            }
            NodeRef::Client(key) => {
                let client = self
                    .clients
                    .get_mut(&key)
                    .ok_or(ClusterError::UnknownNode { node })?;
                client
                    .session
                    .send_request(target, M::KIND, payload, slot.clone(), now)?
            }
            NodeRef::Peer(server, peer) => {
                let session = self
                    .servers
                    .get_mut(&server)
                    .ok_or(ClusterError::UnknownNode { node })?;
                session.send_request(&peer, target, M::KIND, payload, slot.clone(), now)?
            }
        };
        Ok((response_id, slot))
    }

    /// Sends an entity message that expects no response
    pub fn send_message<M: Message>(
        &mut self,
        node: NodeRef,
        target: Identity,
        message: &M,
    ) -> Result<(), ClusterError> {
        self.check_registered(M::KIND)?;
        let event = NetworkEvent::EntityMessage(EntityMessageEvent {
            target,
            kind: M::KIND,
            exec: ExecKind::Plain,
            payload: message.to_payload(),
        });
        self.send_event(node, event)
    }

    /// Answers a request that arrived from `origin`
    pub fn respond<M: Message>(
        &mut self,
        origin: NodeRef,
        response_id: ResponseId,
        response: &M,
    ) -> Result<(), ClusterError> {
        self.check_registered(M::KIND)?;
        let event = NetworkEvent::Response(ResponseEvent {
            kind: M::KIND,
            response_id,
            payload: response.to_payload(),
        });
        self.send_event(origin, event)
    }

    /// Sends an RPC to one node, or to every peer of the default server
    /// session when `node` is None
    pub fn send_rpc(
        &mut self,
        node: Option<NodeRef>,
        target: Identity,
        method: &str,
        params: Vec<RpcParam>,
    ) -> Result<(), ClusterError> {
        let event = NetworkEvent::Rpc(RpcEvent {
            target,
            method: method.to_string(),
            params,
        });
        match node {
            Some(node) => self.send_event(node, event),
            None => self.broadcast(&event),
        }
    }

    /// Broadcasts a state blob for `target` to every peer of the default
    /// server session
    pub fn synchronize(&mut self, target: Identity, data: Vec<u8>) -> Result<(), ClusterError> {
        self.broadcast(&NetworkEvent::Synchronize(SyncEvent { target, data }))
    }

    fn broadcast(&mut self, event: &NetworkEvent) -> Result<(), ClusterError> {
        let key = self.default_server.ok_or(ClusterError::NoServerSession)?;
        let session = self
            .servers
            .get_mut(&key)
            .ok_or(ClusterError::NoServerSession)?;
        session.broadcast(event)?;
        Ok(())
    }

    fn send_event(&mut self, node: NodeRef, event: NetworkEvent) -> Result<(), ClusterError> {
        match node {
            NodeRef::Local => {
                event.validate().map_err(|error| RequestError::Unroutable {
                    reason: error.to_string(),
                })?;
                self.loopback.send_event(event);
            }
            NodeRef::Client(key) => {
                let client = self
                    .clients
                    .get_mut(&key)
                    .ok_or(ClusterError::UnknownNode { node })?;
                client.session.send_event(&event)?;
            }
            NodeRef::Peer(server, peer) => {
                let session = self
                    .servers
                    .get_mut(&server)
                    .ok_or(ClusterError::UnknownNode { node })?;
                session.send_event(&peer, &event)?;
            }
        }
        Ok(())
    }

    fn check_registered(&self, kind: MessageKind) -> Result<(), ClusterError> {
        if self.message_kinds.contains(&kind) {
            Ok(())
        } else {
            Err(ClusterError::unregistered(kind))
        }
    }
}

fn classify(
    message_kinds: &MessageKinds,
    origin: NodeRef,
    event: NetworkEvent,
    events: &mut Vec<ProcessEvent>,
    inbound: &mut Vec<Inbound>,
) {
    match event {
        NetworkEvent::EntityMessage(message) => {
            if !message_kinds.contains(&message.kind) {
                warn!(
                    "Dropping entity message of unregistered kind {} from {:?}",
                    message.kind.net_id(),
                    origin
                );
                return;
            }
            inbound.push(Inbound {
                origin,
                target: message.target,
                kind: message.kind,
                response_id: message.exec.response_id(),
                payload: message.payload,
            });
        }
        NetworkEvent::Rpc(rpc) => events.push(ProcessEvent::Rpc { origin, rpc }),
        NetworkEvent::Synchronize(sync) => events.push(ProcessEvent::Synchronize { origin, sync }),
        NetworkEvent::Response(response) => warn!(
            "Dropping stray response {} from {:?}",
            response.response_id, origin
        ),
    }
}
