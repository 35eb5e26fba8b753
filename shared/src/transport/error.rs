use thiserror::Error;

/// Errors that can occur while opening or using a link
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Nothing is listening at the address
    #[error("Connection to {address} refused. Check that a process is listening there")]
    ConnectionRefused { address: String },

    /// Another listener already holds the address
    #[error("Address {address} is already in use")]
    AddressInUse { address: String },

    /// The link or listener has been closed
    #[error("Link is closed")]
    Closed,

    /// A frame does not fit the u16 length prefix
    #[error("Frame of {size} bytes exceeds the transport limit of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },

    /// Any other I/O failure
    #[error("Transport I/O error: {message}")]
    Io { message: String },
}
