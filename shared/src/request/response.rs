use crate::{request::error::RequestError, Message, MessageKind, Outcome};

/// Undecoded response as it came off the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

impl ResponseEnvelope {
    pub fn from_message<M: Message>(message: &M) -> Self {
        Self {
            kind: M::KIND,
            payload: message.to_payload(),
        }
    }

    /// Decodes the payload as `M`, checking the kind first
    pub fn read<M: Message>(&self) -> Result<M, RequestError> {
        if self.kind != M::KIND {
            return Err(RequestError::UnexpectedResponse {
                expected: M::KIND.net_id(),
                actual: self.kind.net_id(),
            });
        }
        M::from_payload(&self.payload).map_err(|_| RequestError::MalformedPayload {
            kind: self.kind.net_id(),
        })
    }
}

/// Where a pending request's result lands
pub type ResponseSlot = Outcome<Result<ResponseEnvelope, RequestError>>;
