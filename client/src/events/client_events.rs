use std::{mem, vec::IntoIter};

use arbor_shared::NetworkEvent;

use crate::ClientError;

/// Everything a client session observed during one `receive`
pub struct ClientEvents {
    connected: bool,
    disconnected: bool,
    events: Vec<NetworkEvent>,
    errors: Vec<ClientError>,

    empty: bool,
}

impl ClientEvents {
    pub(crate) fn new() -> Self {
        Self {
            connected: false,
            disconnected: false,
            events: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ClientEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ClientEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self) {
        self.connected = true;
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self) {
        self.disconnected = true;
        self.empty = false;
    }

    pub(crate) fn push_event(&mut self, event: NetworkEvent) {
        self.events.push(event);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: ClientError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait ClientEvent {
    type Iter;

    fn iter(events: &mut ClientEvents) -> Self::Iter;

    fn has(events: &ClientEvents) -> bool;
}

// ConnectEvent
pub struct ConnectEvent;
impl ClientEvent for ConnectEvent {
    type Iter = IntoIter<()>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = if mem::take(&mut events.connected) {
            vec![()]
        } else {
            Vec::new()
        };
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        events.connected
    }
}

// DisconnectEvent
pub struct DisconnectEvent;
impl ClientEvent for DisconnectEvent {
    type Iter = IntoIter<()>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = if mem::take(&mut events.disconnected) {
            vec![()]
        } else {
            Vec::new()
        };
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        events.disconnected
    }
}

// NetworkEventReceived
pub struct NetworkEventReceived;
impl ClientEvent for NetworkEventReceived {
    type Iter = IntoIter<NetworkEvent>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = mem::take(&mut events.events);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        !events.events.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl ClientEvent for ErrorEvent {
    type Iter = IntoIter<ClientError>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        !events.errors.is_empty()
    }
}
