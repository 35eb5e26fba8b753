use arbor_shared::{Identity, Message, MessageKind, ResponseId};

use crate::{error::HandlerError, network::NodeRef};

/// An entity message waiting to be dispatched to its target's handlers
#[derive(Clone, Debug)]
pub struct Inbound {
    pub origin: NodeRef,
    pub target: Identity,
    pub kind: MessageKind,
    pub response_id: Option<ResponseId>,
    pub payload: Vec<u8>,
}

impl Inbound {
    pub fn read<M: Message>(&self) -> Result<M, HandlerError> {
        M::from_payload(&self.payload).map_err(|_| HandlerError::Malformed {
            net_id: self.kind.net_id(),
        })
    }

    /// Response id the handler must answer on
    pub fn expect_response_id(&self) -> Result<ResponseId, HandlerError> {
        self.response_id.ok_or(HandlerError::NotARequest {
            net_id: self.kind.net_id(),
        })
    }
}
