use thiserror::Error;

/// Errors that can occur during message kind registration and lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageKindsError {
    /// A different message type already uses this network id
    #[error("Message kind {net_id} is already registered to '{existing}', cannot register '{name}'. Every message type needs its own network id")]
    DuplicateMessageKind {
        net_id: u16,
        existing: &'static str,
        name: &'static str,
    },

    /// Network ID not found in registry
    #[error("Message kind {net_id} not found in message registry. Message type must be registered with Protocol via add_message()")]
    NetIdNotFound { net_id: u16 },
}
