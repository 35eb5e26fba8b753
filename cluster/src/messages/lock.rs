use arbor_shared::{Message, MessageKind, ResponseId, Serde, SerdeErr, WireReader, WireWrite};

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LockRequest;

impl Serde for LockRequest {
    fn ser(&self, _: &mut dyn WireWrite) {}

    fn de(_: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self)
    }
}

impl Message for LockRequest {
    const KIND: MessageKind = MessageKind::new(6);
    const NAME: &'static str = "LockRequest";
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct UnlockRequest;

impl Serde for UnlockRequest {
    fn ser(&self, _: &mut dyn WireWrite) {}

    fn de(_: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self)
    }
}

impl Message for UnlockRequest {
    const KIND: MessageKind = MessageKind::new(7);
    const NAME: &'static str = "UnlockRequest";
}

/// Withdraws the lock request sent with `response_id`. Sent without a
/// response id once the requester stops waiting for the grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CancelLock {
    pub response_id: ResponseId,
}

impl Serde for CancelLock {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.response_id.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            response_id: ResponseId::de(reader)?,
        })
    }
}

impl Message for CancelLock {
    const KIND: MessageKind = MessageKind::new(13);
    const NAME: &'static str = "CancelLock";
}

/// Answer to lock and unlock requests
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ack {
    pub success: bool,
}

impl Serde for Ack {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.success.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            success: bool::de(reader)?,
        })
    }
}

impl Message for Ack {
    const KIND: MessageKind = MessageKind::new(8);
    const NAME: &'static str = "Ack";
}
