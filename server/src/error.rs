use thiserror::Error;

use arbor_shared::{ConnectionError, RequestError, TransportError};

use crate::PeerKey;

/// Errors that can occur in a server session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Peer key does not belong to a connected peer
    #[error("Peer {key:?} is not connected to this server session. It may have disconnected earlier in the tick")]
    NoSuchPeer { key: PeerKey },
}
