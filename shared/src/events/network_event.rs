use arbor_serde::{Serde, SerdeErr, WireReader, WireWrite, WireWriter};

use crate::{events::error::EventError, Identity, MessageKind, ResponseId, RpcParam};

/// Largest byte payload an event can carry
pub const MAX_PAYLOAD_BYTES: usize = u16::MAX as usize;
/// Largest number of parameters an RPC can carry
pub const MAX_RPC_PARAMS: usize = u8::MAX as usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
enum EventType {
    Rpc = 0,
    Synchronize = 1,
    EntityMessage = 2,
    EntityMessageResponse = 3,
}

impl EventType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Rpc),
            1 => Some(Self::Synchronize),
            2 => Some(Self::EntityMessage),
            3 => Some(Self::EntityMessageResponse),
            _ => None,
        }
    }
}

/// Whether an entity message expects a response
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExecKind {
    Plain,
    Request(ResponseId),
}

impl ExecKind {
    pub fn response_id(&self) -> Option<ResponseId> {
        match self {
            Self::Plain => None,
            Self::Request(id) => Some(*id),
        }
    }
}

impl Serde for ExecKind {
    fn ser(&self, writer: &mut dyn WireWrite) {
        match self {
            Self::Plain => 0u8.ser(writer),
            Self::Request(id) => {
                1u8.ser(writer);
                id.ser(writer);
            }
        }
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        match u8::de(reader)? {
            0 => Ok(Self::Plain),
            1 => Ok(Self::Request(ResponseId::de(reader)?)),
            _ => Err(SerdeErr),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RpcEvent {
    pub target: Identity,
    pub method: String,
    pub params: Vec<RpcParam>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncEvent {
    pub target: Identity,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityMessageEvent {
    pub target: Identity,
    pub kind: MessageKind,
    pub exec: ExecKind,
    pub payload: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseEvent {
    pub kind: MessageKind,
    pub response_id: ResponseId,
    pub payload: Vec<u8>,
}

/// Unit of application traffic between two sessions
#[derive(Clone, Debug, PartialEq)]
pub enum NetworkEvent {
    Rpc(RpcEvent),
    Synchronize(SyncEvent),
    EntityMessage(EntityMessageEvent),
    Response(ResponseEvent),
}

impl NetworkEvent {
    /// Checks every length prefix fits before the event is written
    pub fn validate(&self) -> Result<(), EventError> {
        match self {
            Self::Rpc(rpc) => {
                if rpc.params.len() > MAX_RPC_PARAMS {
                    return Err(EventError::TooManyParams {
                        method: rpc.method.clone(),
                        count: rpc.params.len(),
                        max: MAX_RPC_PARAMS,
                    });
                }
                check_payload(rpc.method.len())?;
                for param in &rpc.params {
                    if let RpcParam::String(value) = param {
                        check_payload(value.len())?;
                    }
                }
                Ok(())
            }
            Self::Synchronize(sync) => check_payload(sync.data.len()),
            Self::EntityMessage(message) => check_payload(message.payload.len()),
            Self::Response(response) => check_payload(response.payload.len()),
        }
    }

    /// Validates and writes the event into a standalone buffer
    pub fn encode(&self) -> Result<Vec<u8>, EventError> {
        self.validate()?;
        let mut writer = WireWriter::new();
        self.ser(&mut writer);
        Ok(writer.to_bytes())
    }

    pub fn target(&self) -> Option<Identity> {
        match self {
            Self::Rpc(rpc) => Some(rpc.target),
            Self::Synchronize(sync) => Some(sync.target),
            Self::EntityMessage(message) => Some(message.target),
            Self::Response(_) => None,
        }
    }
}

fn check_payload(size: usize) -> Result<(), EventError> {
    if size > MAX_PAYLOAD_BYTES {
        Err(EventError::PayloadTooLarge {
            size,
            max: MAX_PAYLOAD_BYTES,
        })
    } else {
        Ok(())
    }
}

fn write_blob(bytes: &[u8], writer: &mut dyn WireWrite) {
    (bytes.len() as u16).ser(writer);
    writer.write_bytes(bytes);
}

fn read_blob(reader: &mut WireReader) -> Result<Vec<u8>, SerdeErr> {
    let length = u16::de(reader)? as usize;
    Ok(reader.read_bytes(length)?.to_vec())
}

impl Serde for NetworkEvent {
    fn ser(&self, writer: &mut dyn WireWrite) {
        match self {
            Self::Rpc(rpc) => {
                (EventType::Rpc as u8).ser(writer);
                rpc.target.ser(writer);
                rpc.method.ser(writer);
                (rpc.params.len() as u8).ser(writer);
                for param in &rpc.params {
                    param.ser(writer);
                }
            }
            Self::Synchronize(sync) => {
                (EventType::Synchronize as u8).ser(writer);
                sync.target.ser(writer);
                write_blob(&sync.data, writer);
            }
            Self::EntityMessage(message) => {
                (EventType::EntityMessage as u8).ser(writer);
                message.target.ser(writer);
                message.kind.ser(writer);
                message.exec.ser(writer);
                write_blob(&message.payload, writer);
            }
            Self::Response(response) => {
                (EventType::EntityMessageResponse as u8).ser(writer);
                response.kind.ser(writer);
                response.response_id.ser(writer);
                write_blob(&response.payload, writer);
            }
        }
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        let event_type = EventType::from_u8(u8::de(reader)?).ok_or(SerdeErr)?;
        match event_type {
            EventType::Rpc => {
                let target = Identity::de(reader)?;
                let method = String::de(reader)?;
                let count = u8::de(reader)?;
                let mut params = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    params.push(RpcParam::de(reader)?);
                }
                Ok(Self::Rpc(RpcEvent {
                    target,
                    method,
                    params,
                }))
            }
            EventType::Synchronize => Ok(Self::Synchronize(SyncEvent {
                target: Identity::de(reader)?,
                data: read_blob(reader)?,
            })),
            EventType::EntityMessage => Ok(Self::EntityMessage(EntityMessageEvent {
                target: Identity::de(reader)?,
                kind: MessageKind::de(reader)?,
                exec: ExecKind::de(reader)?,
                payload: read_blob(reader)?,
            })),
            EventType::EntityMessageResponse => Ok(Self::Response(ResponseEvent {
                kind: MessageKind::de(reader)?,
                response_id: ResponseId::de(reader)?,
                payload: read_blob(reader)?,
            })),
        }
    }
}
