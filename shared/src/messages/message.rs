use arbor_serde::{Serde, SerdeErr, WireReader, WireWriter};

use crate::MessageKind;

/// A typed payload carried inside an entity message or response event
pub trait Message: Serde + 'static {
    /// Network id, unique within a protocol
    const KIND: MessageKind;
    /// Human readable name used in logs and errors
    const NAME: &'static str;

    fn to_payload(&self) -> Vec<u8> {
        let mut writer = WireWriter::new();
        self.ser(&mut writer);
        writer.to_bytes()
    }

    fn from_payload(payload: &[u8]) -> Result<Self, SerdeErr> {
        let mut reader = WireReader::new(payload);
        Self::de(&mut reader)
    }
}
