use arbor_shared::{Identity, Message, MessageKind, Serde, SerdeErr, WireReader, WireWrite};

/// Sent by a process with no identity yet to the server it connected to
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RequestPeerId;

impl Serde for RequestPeerId {
    fn ser(&self, _: &mut dyn WireWrite) {}

    fn de(_: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self)
    }
}

impl Message for RequestPeerId {
    const KIND: MessageKind = MessageKind::new(1);
    const NAME: &'static str = "RequestPeerId";
}

/// Sent by a process that already has an identity when it opens another
/// client session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterPeerId {
    pub peer_id: Identity,
}

impl Serde for RegisterPeerId {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.peer_id.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            peer_id: Identity::de(reader)?,
        })
    }
}

impl Message for RegisterPeerId {
    const KIND: MessageKind = MessageKind::new(2);
    const NAME: &'static str = "RegisterPeerId";
}

/// Answer to both peer id requests: the identity the server now knows the
/// client by
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerIdResponse {
    pub peer_id: Identity,
}

impl Serde for PeerIdResponse {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.peer_id.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            peer_id: Identity::de(reader)?,
        })
    }
}

impl Message for PeerIdResponse {
    const KIND: MessageKind = MessageKind::new(3);
    const NAME: &'static str = "PeerIdResponse";
}
