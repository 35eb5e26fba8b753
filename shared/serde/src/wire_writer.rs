/// Sink for serialized bytes
pub trait WireWrite {
    fn write_byte(&mut self, byte: u8);
    fn write_bytes(&mut self, bytes: &[u8]);
    fn bytes_written(&self) -> usize;
}

/// A WireWrite implementation backed by a growable buffer.
/// Events of any size are written here first and only checked against the
/// frame limit when they are packed for sending.
pub struct WireWriter {
    buffer: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WireWrite for WireWriter {
    fn write_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    fn bytes_written(&self) -> usize {
        self.buffer.len()
    }
}
