mod error;

pub use error::TransportError;

use crate::PeerAddress;

cfg_if! {
    if #[cfg(feature = "transport_tcp")] {
        pub mod tcp;
    }
}

/// Opens listeners and outgoing links. Implemented by the TCP transport and
/// by in-memory transports used in tests.
pub trait Transport {
    fn listen(&mut self, address: &PeerAddress) -> Result<Box<dyn Listener>, TransportError>;
    fn connect(&mut self, address: &PeerAddress) -> Result<Box<dyn Link>, TransportError>;
}

/// Accepts incoming links without blocking
pub trait Listener {
    /// Next pending link, if any
    fn accept(&mut self) -> Result<Option<Box<dyn Link>>, TransportError>;
    fn close(&mut self);
}

/// A reliable, ordered, bidirectional stream of frames
pub trait Link {
    /// Queues a frame for delivery
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;
    /// Next fully received frame, if any. Never blocks.
    fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
    fn is_connected(&self) -> bool;
    fn close(&mut self);
}
