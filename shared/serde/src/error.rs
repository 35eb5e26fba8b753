use thiserror::Error;

/// Raised whenever a value cannot be read back from a byte buffer, either
/// because the buffer ran out or because the bytes do not form a valid value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Failed to deserialize value from wire bytes")]
pub struct SerdeErr;
