use crate::SerdeErr;

/// Cursor over a received byte buffer
pub struct WireReader<'b> {
    buffer: &'b [u8],
    cursor: usize,
}

impl<'b> WireReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let byte = *self.buffer.get(self.cursor).ok_or(SerdeErr)?;
        self.cursor += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], SerdeErr> {
        let end = self.cursor.checked_add(count).ok_or(SerdeErr)?;
        let bytes = self.buffer.get(self.cursor..end).ok_or(SerdeErr)?;
        self.cursor = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let mut output = [0u8; N];
        output.copy_from_slice(self.read_bytes(N)?);
        Ok(output)
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
