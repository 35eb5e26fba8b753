use std::{mem, vec::IntoIter};

use arbor_shared::{Identity, NetworkEvent};

use crate::{PeerKey, ServerError};

/// Everything a server session observed during one `receive`
pub struct ServerEvents {
    connections: Vec<PeerKey>,
    disconnections: Vec<(PeerKey, Option<Identity>)>,
    events: Vec<(PeerKey, NetworkEvent)>,
    errors: Vec<ServerError>,

    empty: bool,
}

impl ServerEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            events: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ServerEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ServerEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, peer_key: &PeerKey) {
        self.connections.push(*peer_key);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, peer_key: &PeerKey, peer_id: Option<Identity>) {
        self.disconnections.push((*peer_key, peer_id));
        self.empty = false;
    }

    pub(crate) fn push_event(&mut self, peer_key: &PeerKey, event: NetworkEvent) {
        self.events.push((*peer_key, event));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: ServerError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait ServerEvent {
    type Iter;

    fn iter(events: &mut ServerEvents) -> Self::Iter;

    fn has(events: &ServerEvents) -> bool;
}

// ConnectEvent
pub struct ConnectEvent;
impl ServerEvent for ConnectEvent {
    type Iter = IntoIter<PeerKey>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = mem::take(&mut events.connections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.connections.is_empty()
    }
}

// DisconnectEvent
pub struct DisconnectEvent;
impl ServerEvent for DisconnectEvent {
    type Iter = IntoIter<(PeerKey, Option<Identity>)>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = mem::take(&mut events.disconnections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.disconnections.is_empty()
    }
}

// NetworkEventReceived
pub struct NetworkEventReceived;
impl ServerEvent for NetworkEventReceived {
    type Iter = IntoIter<(PeerKey, NetworkEvent)>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = mem::take(&mut events.events);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.events.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl ServerEvent for ErrorEvent {
    type Iter = IntoIter<ServerError>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.errors.is_empty()
    }
}
