use std::{
    io::{ErrorKind, Read, Write},
    net::{TcpListener, TcpStream, ToSocketAddrs},
};

use log::{trace, warn};

use crate::{
    transport::{Link, Listener, Transport, TransportError},
    PeerAddress,
};

const MAX_FRAME: usize = u16::MAX as usize;
const READ_CHUNK: usize = 4096;

/// Non-blocking TCP transport. Each frame goes on the stream behind a
/// little-endian u16 length.
#[derive(Default)]
pub struct TcpTransport;

impl TcpTransport {
    pub fn new() -> Self {
        Self
    }
}

fn io_error(error: std::io::Error) -> TransportError {
    TransportError::Io {
        message: error.to_string(),
    }
}

impl Transport for TcpTransport {
    fn listen(&mut self, address: &PeerAddress) -> Result<Box<dyn Listener>, TransportError> {
        let listener = TcpListener::bind((address.host.as_str(), address.port)).map_err(|error| {
            match error.kind() {
                ErrorKind::AddrInUse => TransportError::AddressInUse {
                    address: address.to_string(),
                },
                _ => io_error(error),
            }
        })?;
        listener.set_nonblocking(true).map_err(io_error)?;
        Ok(Box::new(TcpServerListener {
            listener: Some(listener),
        }))
    }

    fn connect(&mut self, address: &PeerAddress) -> Result<Box<dyn Link>, TransportError> {
        let socket_address = (address.host.as_str(), address.port)
            .to_socket_addrs()
            .map_err(io_error)?
            .next()
            .ok_or_else(|| TransportError::ConnectionRefused {
                address: address.to_string(),
            })?;
        let stream = TcpStream::connect(socket_address).map_err(|error| match error.kind() {
            ErrorKind::ConnectionRefused => TransportError::ConnectionRefused {
                address: address.to_string(),
            },
            _ => io_error(error),
        })?;
        Ok(Box::new(TcpLink::new(stream)?))
    }
}

pub struct TcpServerListener {
    listener: Option<TcpListener>,
}

impl Listener for TcpServerListener {
    fn accept(&mut self) -> Result<Option<Box<dyn Link>>, TransportError> {
        let Some(listener) = &self.listener else {
            return Err(TransportError::Closed);
        };
        match listener.accept() {
            Ok((stream, remote)) => {
                trace!("Accepted TCP link from {}", remote);
                Ok(Some(Box::new(TcpLink::new(stream)?)))
            }
            Err(error) if error.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(io_error(error)),
        }
    }

    fn close(&mut self) {
        self.listener = None;
    }
}

pub struct TcpLink {
    stream: TcpStream,
    read_buffer: Vec<u8>,
    write_buffer: Vec<u8>,
    connected: bool,
}

impl TcpLink {
    fn new(stream: TcpStream) -> Result<Self, TransportError> {
        stream.set_nonblocking(true).map_err(io_error)?;
        stream.set_nodelay(true).map_err(io_error)?;
        Ok(Self {
            stream,
            read_buffer: Vec::new(),
            write_buffer: Vec::new(),
            connected: true,
        })
    }

    fn flush_writes(&mut self) -> Result<(), TransportError> {
        while !self.write_buffer.is_empty() {
            match self.stream.write(&self.write_buffer) {
                Ok(0) => {
                    self.connected = false;
                    return Err(TransportError::Closed);
                }
                Ok(written) => {
                    self.write_buffer.drain(..written);
                }
                Err(error) if error.kind() == ErrorKind::WouldBlock => break,
                Err(error) => {
                    self.connected = false;
                    return Err(io_error(error));
                }
            }
        }
        Ok(())
    }

    fn fill_reads(&mut self) -> Result<(), TransportError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    self.connected = false;
                    return Ok(());
                }
                Ok(read) => self.read_buffer.extend_from_slice(&chunk[..read]),
                Err(error) if error.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(error) => {
                    self.connected = false;
                    return Err(io_error(error));
                }
            }
        }
    }

    fn next_frame(&mut self) -> Option<Vec<u8>> {
        if self.read_buffer.len() < 2 {
            return None;
        }
        let length = u16::from_le_bytes([self.read_buffer[0], self.read_buffer[1]]) as usize;
        if self.read_buffer.len() < 2 + length {
            return None;
        }
        let frame = self.read_buffer[2..2 + length].to_vec();
        self.read_buffer.drain(..2 + length);
        Some(frame)
    }
}

impl Link for TcpLink {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::Closed);
        }
        if frame.len() > MAX_FRAME {
            return Err(TransportError::FrameTooLarge {
                size: frame.len(),
                max: MAX_FRAME,
            });
        }
        self.write_buffer
            .extend_from_slice(&(frame.len() as u16).to_le_bytes());
        self.write_buffer.extend_from_slice(frame);
        self.flush_writes()
    }

    fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if let Some(frame) = self.next_frame() {
            return Ok(Some(frame));
        }
        if !self.connected {
            return Err(TransportError::Closed);
        }
        self.flush_writes()?;
        self.fill_reads()?;
        if let Some(frame) = self.next_frame() {
            return Ok(Some(frame));
        }
        if !self.connected {
            if !self.read_buffer.is_empty() {
                warn!("TCP link closed with {} bytes of a partial frame", self.read_buffer.len());
            }
            return Err(TransportError::Closed);
        }
        Ok(None)
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn close(&mut self) {
        if self.connected {
            // best effort, the peer may already be gone
            let _ = self.flush_writes();
            let _ = self.stream.shutdown(std::net::Shutdown::Both);
            self.connected = false;
        }
    }
}
