use std::collections::BTreeMap;

use log::{debug, info, warn};

use arbor_shared::{
    transport::{Listener, Transport},
    Connection, ConnectionConfig, EntityMessageEvent, ExecKind, Identity, MessageKind,
    NetworkEvent, PeerAddress, RequestError, RequestTable, ResponseEnvelope, ResponseEvent,
    ResponseId, ResponseSlot, Tick,
};

use crate::{events::ServerEvents, PeerKey, ServerError, ServerPeer};

/// Listening side of a session. Holds one connection per accepted peer and
/// one request table shared by all of them.
pub struct ServerSession {
    address: PeerAddress,
    listener: Box<dyn Listener>,
    config: ConnectionConfig,
    peers: BTreeMap<PeerKey, ServerPeer>,
    next_peer_key: u64,
    requests: RequestTable<PeerKey>,
}

impl ServerSession {
    /// Starts listening on `address`
    pub fn listen(
        transport: &mut dyn Transport,
        address: &PeerAddress,
        config: &ConnectionConfig,
    ) -> Result<Self, ServerError> {
        let listener = transport.listen(address)?;
        info!("Server session listening on {}", address);
        Ok(Self {
            address: address.clone(),
            listener,
            config: config.clone(),
            peers: BTreeMap::new(),
            next_peer_key: 0,
            requests: RequestTable::new(),
        })
    }

    pub fn address(&self) -> &PeerAddress {
        &self.address
    }

    // Read phase

    /// Accepts pending links, then reads a bounded batch of events from
    /// every peer. Responses are matched against the request table here and
    /// never surface as events. Peers whose link closed are removed and
    /// their outstanding requests fail with `SessionClosed`.
    pub fn receive(&mut self) -> ServerEvents {
        let mut events = ServerEvents::new();

        loop {
            match self.listener.accept() {
                Ok(Some(link)) => {
                    let key = PeerKey::new(self.next_peer_key);
                    self.next_peer_key += 1;
                    let connection = Connection::new(link, &self.config);
                    self.peers.insert(key, ServerPeer::new(connection));
                    debug!("Server session {} accepted peer {:?}", self.address, key);
                    events.push_connection(&key);
                }
                Ok(None) => break,
                Err(error) => {
                    events.push_error(error.into());
                    break;
                }
            }
        }

        let mut closed = Vec::new();
        for (key, peer) in self.peers.iter_mut() {
            let (received, error) = peer.connection.receive_events();
            for event in received {
                match event {
                    NetworkEvent::Response(response) => {
                        let envelope = ResponseEnvelope {
                            kind: response.kind,
                            payload: response.payload,
                        };
                        let resolved = self
                            .requests
                            .resolve_from(*key, response.response_id, envelope);
                        if let Err(error) = resolved {
                            warn!("Dropping response from peer {:?}: {}", key, error);
                        }
                    }
                    event => events.push_event(key, event),
                }
            }
            if error.is_some() || !peer.connection.is_connected() {
                closed.push(*key);
            }
        }

        for key in closed {
            if let Some(mut peer) = self.peers.remove(&key) {
                peer.connection.close();
                let failed = self.requests.fail_node(key, RequestError::SessionClosed);
                info!(
                    "Peer {:?} ({:?}) disconnected from {}, {} pending requests failed",
                    key,
                    peer.peer_id(),
                    self.address,
                    failed
                );
                events.push_disconnection(&key, peer.peer_id());
            }
        }

        events
    }

    // Write phase

    /// Flushes every peer's outgoing events. A peer whose link fails is
    /// closed and reported as disconnected on the next `receive`.
    pub fn send_all(&mut self) {
        for (key, peer) in self.peers.iter_mut() {
            if let Err(error) = peer.connection.flush() {
                warn!("Failed to flush events to peer {:?}: {}", key, error);
                peer.connection.close();
            }
        }
    }

    // Sending

    pub fn send_event(&mut self, key: &PeerKey, event: &NetworkEvent) -> Result<(), ServerError> {
        let peer = self
            .peers
            .get_mut(key)
            .ok_or(ServerError::NoSuchPeer { key: *key })?;
        peer.connection.queue_event(event)?;
        Ok(())
    }

    /// Queues the event for every connected peer
    pub fn broadcast(&mut self, event: &NetworkEvent) -> Result<(), ServerError> {
        for peer in self.peers.values_mut() {
            peer.connection.queue_event(event)?;
        }
        Ok(())
    }

    /// Sends a correlated entity message. The slot resolves when the peer
    /// answers, or fails if the peer disconnects first.
    pub fn send_request(
        &mut self,
        key: &PeerKey,
        target: Identity,
        kind: MessageKind,
        payload: Vec<u8>,
        slot: ResponseSlot,
        now: Tick,
    ) -> Result<ResponseId, ServerError> {
        let peer = self
            .peers
            .get_mut(key)
            .ok_or(ServerError::NoSuchPeer { key: *key })?;
        let response_id = self.requests.register(*key, slot, now)?;
        let event = NetworkEvent::EntityMessage(EntityMessageEvent {
            target,
            kind,
            exec: ExecKind::Request(response_id),
            payload,
        });
        if let Err(error) = peer.connection.queue_event(&event) {
            self.requests.fail(
                response_id,
                RequestError::Unroutable {
                    reason: error.to_string(),
                },
            );
            return Err(error.into());
        }
        Ok(response_id)
    }

    pub fn send_response(
        &mut self,
        key: &PeerKey,
        response_id: ResponseId,
        kind: MessageKind,
        payload: Vec<u8>,
    ) -> Result<(), ServerError> {
        self.send_event(
            key,
            &NetworkEvent::Response(ResponseEvent {
                kind,
                response_id,
                payload,
            }),
        )
    }

    /// Fails requests that have waited `timeout` ticks or longer
    pub fn expire_requests(&mut self, now: Tick, timeout: Tick) -> usize {
        self.requests.expire(now, timeout)
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    // Peers

    pub fn peer(&self, key: &PeerKey) -> Option<&ServerPeer> {
        self.peers.get(key)
    }

    pub fn peer_keys(&self) -> Vec<PeerKey> {
        self.peers.keys().copied().collect()
    }

    pub fn peers_count(&self) -> usize {
        self.peers.len()
    }

    pub fn peer_id(&self, key: &PeerKey) -> Option<Identity> {
        self.peers.get(key).and_then(|peer| peer.peer_id())
    }

    pub fn set_peer_id(&mut self, key: &PeerKey, peer_id: Identity) -> Result<(), ServerError> {
        let peer = self
            .peers
            .get_mut(key)
            .ok_or(ServerError::NoSuchPeer { key: *key })?;
        peer.set_peer_id(peer_id);
        Ok(())
    }

    /// Key of the connected peer with the given identity
    pub fn peer_key_of(&self, peer_id: &Identity) -> Option<PeerKey> {
        self.peers
            .iter()
            .find(|(_, peer)| peer.peer_id().as_ref() == Some(peer_id))
            .map(|(key, _)| *key)
    }

    /// Closes the peer's link. It is removed on the next `receive`.
    pub fn disconnect(&mut self, key: &PeerKey) {
        if let Some(peer) = self.peers.get_mut(key) {
            peer.connection.close();
        }
    }

    /// Stops listening and drops every peer
    pub fn close(&mut self) {
        self.listener.close();
        for peer in self.peers.values_mut() {
            peer.connection.close();
        }
        self.peers.clear();
        self.requests.fail_all(RequestError::SessionClosed);
    }
}
