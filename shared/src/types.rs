use std::fmt;

use arbor_serde::{Serde, SerdeErr, WireReader, WireWrite};

/// Process tick counter, advanced once per `update`
pub type Tick = u64;

/// Short correlation id pairing a request with its response on one session
pub type ResponseId = u16;

/// Network id of a registered message type
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKind(u16);

impl MessageKind {
    pub const fn new(net_id: u16) -> Self {
        Self(net_id)
    }

    pub fn net_id(&self) -> u16 {
        self.0
    }
}

impl Serde for MessageKind {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self(u16::de(reader)?))
    }
}

/// Host/port pair a process listens on or connects to
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    pub host: String,
    pub port: u16,
}

impl PeerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
