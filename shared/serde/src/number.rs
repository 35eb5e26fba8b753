use crate::{Serde, SerdeErr, WireReader, WireWrite};

impl Serde for f32 {
    fn ser(&self, writer: &mut dyn WireWrite) {
        writer.write_bytes(&self.to_le_bytes());
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(f32::from_le_bytes(reader.read_array()?))
    }
}

/// Two dimensional vector, carried by RPC parameters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Serde for Vec2 {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.x.ser(writer);
        self.y.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        let x = f32::de(reader)?;
        let y = f32::de(reader)?;
        Ok(Self { x, y })
    }
}
