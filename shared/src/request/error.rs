use thiserror::Error;

use crate::{ResponseId, Tick};

/// Reasons a request can fail to produce a response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Every correlation id on the session is in use
    #[error("All {capacity} response ids on this session are in use. Too many requests are outstanding")]
    TableExhausted { capacity: usize },

    /// Response arrived for an id that is not pending
    #[error("Response id {id} does not match any pending request. The request may have already completed, timed out or never been sent")]
    UnknownResponseId { id: ResponseId },

    /// Response came from a different node than the request was sent to
    #[error("Response id {id} came from a node the request was not sent to")]
    MisroutedResponse { id: ResponseId },

    /// The session carrying the request closed before a response arrived
    #[error("Session closed before a response arrived")]
    SessionClosed,

    /// No response within the configured timeout
    #[error("No response after {ticks} ticks")]
    TimedOut { ticks: Tick },

    /// Response carried a different message type than the request expected
    #[error("Expected a response of message kind {expected}, received kind {actual}")]
    UnexpectedResponse { expected: u16, actual: u16 },

    /// Response payload could not be decoded
    #[error("Response payload for message kind {kind} could not be decoded")]
    MalformedPayload { kind: u16 },

    /// The request could not be delivered at all
    #[error("Request could not be sent: {reason}")]
    Unroutable { reason: String },
}
