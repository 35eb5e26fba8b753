use log::warn;

use crate::{
    connection::{connection_config::ConnectionConfig, error::ConnectionError},
    events::{pack_frames, read_frame},
    transport::Link,
    NetworkEvent,
};

/// Event-level wrapper over a link. Outgoing events are buffered until
/// `flush`, then packed into as few frames as fit.
pub struct Connection {
    link: Box<dyn Link>,
    outgoing: Vec<Vec<u8>>,
    max_frames_per_read: usize,
    max_frame_bytes: usize,
}

impl Connection {
    pub fn new(link: Box<dyn Link>, config: &ConnectionConfig) -> Self {
        Self {
            link,
            outgoing: Vec::new(),
            max_frames_per_read: config.max_frames_per_read,
            max_frame_bytes: config.max_frame_bytes,
        }
    }

    /// Encodes the event into the outgoing buffer
    pub fn queue_event(&mut self, event: &NetworkEvent) -> Result<(), ConnectionError> {
        let encoded = event.encode()?;
        if encoded.len() > self.max_frame_bytes {
            return Err(crate::EventError::EventTooLarge {
                size: encoded.len(),
                max: self.max_frame_bytes,
            }
            .into());
        }
        self.outgoing.push(encoded);
        Ok(())
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Reads up to the configured number of frames. Malformed frames are
    /// logged and dropped, a closed link is returned as an error after
    /// whatever was read before it.
    pub fn receive_events(&mut self) -> (Vec<NetworkEvent>, Option<ConnectionError>) {
        let mut events = Vec::new();
        for _ in 0..self.max_frames_per_read {
            match self.link.receive() {
                Ok(Some(frame)) => match read_frame(&frame) {
                    Ok(mut decoded) => events.append(&mut decoded),
                    Err(error) => warn!("Dropping frame: {}", error),
                },
                Ok(None) => break,
                Err(error) => return (events, Some(error.into())),
            }
        }
        (events, None)
    }

    /// Sends everything queued since the last flush
    pub fn flush(&mut self) -> Result<(), ConnectionError> {
        if self.outgoing.is_empty() {
            return Ok(());
        }
        let frames = pack_frames(std::mem::take(&mut self.outgoing), self.max_frame_bytes)?;
        for frame in frames {
            self.link.send(&frame)?;
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    pub fn close(&mut self) {
        self.outgoing.clear();
        self.link.close();
    }
}
