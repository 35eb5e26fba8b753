use crate::{SerdeErr, WireReader, WireWrite};

/// A value that can be written to and read back from the wire
pub trait Serde: Sized {
    /// Writes the value into the given writer
    fn ser(&self, writer: &mut dyn WireWrite);

    /// Reads a value back out of the reader
    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr>;
}

impl Serde for () {
    fn ser(&self, _: &mut dyn WireWrite) {}

    fn de(_: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(())
    }
}

impl Serde for bool {
    fn ser(&self, writer: &mut dyn WireWrite) {
        writer.write_byte(if *self { 1 } else { 0 });
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(SerdeErr),
        }
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn WireWrite) {
        // longer strings are truncated at a char boundary rather than corrupting the length prefix
        let mut end = self.len().min(u16::MAX as usize);
        while !self.is_char_boundary(end) {
            end -= 1;
        }
        (end as u16).ser(writer);
        writer.write_bytes(&self.as_bytes()[..end]);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        let length = u16::de(reader)? as usize;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerdeErr)
    }
}

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn WireWrite) {
        match self {
            Some(value) => {
                true.ser(writer);
                value.ser(writer);
            }
            None => false.ser(writer),
        }
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        if bool::de(reader)? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn WireWrite) {
        (self.len() as u32).ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        let count = u32::de(reader)? as usize;
        // every element takes at least one byte, so a larger count is a lie
        if count > reader.remaining() {
            return Err(SerdeErr);
        }
        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}
