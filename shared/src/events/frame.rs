use arbor_serde::{Serde, WireReader};

use crate::events::{error::EventError, NetworkEvent};

/// Packs encoded events greedily into frames of at most `max_frame_bytes`.
/// Event order is preserved across frames.
pub fn pack_frames(
    encoded_events: Vec<Vec<u8>>,
    max_frame_bytes: usize,
) -> Result<Vec<Vec<u8>>, EventError> {
    let mut frames = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for event in encoded_events {
        if event.len() > max_frame_bytes {
            return Err(EventError::EventTooLarge {
                size: event.len(),
                max: max_frame_bytes,
            });
        }
        if !current.is_empty() && current.len() + event.len() > max_frame_bytes {
            frames.push(std::mem::take(&mut current));
        }
        current.extend_from_slice(&event);
    }
    if !current.is_empty() {
        frames.push(current);
    }

    Ok(frames)
}

/// Decodes every event in a frame
pub fn read_frame(frame: &[u8]) -> Result<Vec<NetworkEvent>, EventError> {
    let mut reader = WireReader::new(frame);
    let mut events = Vec::new();
    while !reader.is_empty() {
        let offset = frame.len() - reader.remaining();
        match NetworkEvent::de(&mut reader) {
            Ok(event) => events.push(event),
            Err(_) => {
                return Err(EventError::MalformedFrame {
                    decoded: events.len(),
                    offset,
                })
            }
        }
    }
    Ok(events)
}
