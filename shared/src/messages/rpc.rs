use arbor_serde::{Serde, SerdeErr, Vec2, WireReader, WireWrite};

use crate::Identity;

/// A single typed argument of a remote procedure call
#[derive(Clone, Debug, PartialEq)]
pub enum RpcParam {
    Byte(u8),
    Short(i16),
    Int(i32),
    String(String),
    Float(f32),
    Vec2(Vec2),
    Identity(Identity),
    Bool(bool),
}

impl RpcParam {
    /// Tag byte written ahead of the value
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::Byte(_) => 1,
            Self::Short(_) => 2,
            Self::Int(_) => 3,
            Self::String(_) => 4,
            Self::Float(_) => 5,
            Self::Vec2(_) => 6,
            Self::Identity(_) => 7,
            Self::Bool(_) => 8,
        }
    }
}

impl Serde for RpcParam {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.type_tag().ser(writer);
        match self {
            Self::Byte(value) => value.ser(writer),
            Self::Short(value) => value.ser(writer),
            Self::Int(value) => value.ser(writer),
            Self::String(value) => value.ser(writer),
            Self::Float(value) => value.ser(writer),
            Self::Vec2(value) => value.ser(writer),
            Self::Identity(value) => value.ser(writer),
            Self::Bool(value) => value.ser(writer),
        }
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        match u8::de(reader)? {
            1 => Ok(Self::Byte(u8::de(reader)?)),
            2 => Ok(Self::Short(i16::de(reader)?)),
            3 => Ok(Self::Int(i32::de(reader)?)),
            4 => Ok(Self::String(String::de(reader)?)),
            5 => Ok(Self::Float(f32::de(reader)?)),
            6 => Ok(Self::Vec2(Vec2::de(reader)?)),
            7 => Ok(Self::Identity(Identity::de(reader)?)),
            8 => Ok(Self::Bool(bool::de(reader)?)),
            _ => Err(SerdeErr),
        }
    }
}
