use thiserror::Error;

use arbor_shared::{ConnectionError, RequestError, TransportError};

/// Errors that can occur in a client session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Session link is gone
    #[error("Client session to {address} is disconnected. Open a new session to reach the server again")]
    Disconnected { address: String },
}
