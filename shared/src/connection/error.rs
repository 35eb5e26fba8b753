use thiserror::Error;

use crate::{EventError, TransportError};

/// Errors that can occur while moving events over a connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
