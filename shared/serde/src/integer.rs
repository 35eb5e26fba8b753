use crate::{Serde, SerdeErr, WireReader, WireWrite};

macro_rules! impl_serde_for_integer {
    ($($ty:ty),*) => {
        $(
            impl Serde for $ty {
                fn ser(&self, writer: &mut dyn WireWrite) {
                    writer.write_bytes(&self.to_le_bytes());
                }

                fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
                    Ok(<$ty>::from_le_bytes(reader.read_array()?))
                }
            }
        )*
    };
}

impl_serde_for_integer!(u8, i8, u16, i16, u32, i32, u64, i64);
