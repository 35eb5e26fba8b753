use thiserror::Error;

/// Errors that can occur while encoding or decoding network events
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// Payload does not fit its u16 length prefix
    #[error("Payload of {size} bytes exceeds the limit of {max} bytes. Split the data across several messages")]
    PayloadTooLarge { size: usize, max: usize },

    /// RPC parameter count does not fit its u8 prefix
    #[error("RPC '{method}' has {count} parameters, at most {max} are supported")]
    TooManyParams {
        method: String,
        count: usize,
        max: usize,
    },

    /// A single encoded event is larger than a frame
    #[error("Encoded event of {size} bytes does not fit in a frame of {max} bytes. Raise ConnectionConfig::max_frame_bytes or send less data")]
    EventTooLarge { size: usize, max: usize },

    /// Frame bytes could not be decoded into events
    #[error("Malformed frame: decoded {decoded} events before hitting invalid bytes at offset {offset}")]
    MalformedFrame { decoded: usize, offset: usize },
}
