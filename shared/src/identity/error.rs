use thiserror::Error;

/// Errors that can occur while minting identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Identity path is already at its maximum depth
    #[error("Cannot mint a child identity below depth {depth}. Identities support at most {max} levels")]
    DepthExceeded { depth: usize, max: usize },

    /// Local counter ran out of values
    #[error("Identity counter exhausted after {issued} identities. No further local ids can be minted by this peer")]
    CounterExhausted { issued: u16 },

    /// Peer identities can only be minted under Root or Session identities
    #[error("Cannot mint a peer identity under {kind:?}. Peer identities descend from Root or Session identities only")]
    NotAPeer { kind: super::IdentityKind },
}
