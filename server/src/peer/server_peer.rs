use arbor_shared::{Connection, Identity};

/// A remote process connected to a server session
pub struct ServerPeer {
    pub(crate) connection: Connection,
    peer_id: Option<Identity>,
}

impl ServerPeer {
    pub(crate) fn new(connection: Connection) -> Self {
        Self {
            connection,
            peer_id: None,
        }
    }

    /// Identity assigned to or announced by the peer, once known
    pub fn peer_id(&self) -> Option<Identity> {
        self.peer_id
    }

    pub(crate) fn set_peer_id(&mut self, peer_id: Identity) {
        self.peer_id = Some(peer_id);
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }
}
