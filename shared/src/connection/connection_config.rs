use crate::Tick;

/// Limits applied to every session's connection
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Frames read from one link per update, the rest wait for the next tick
    pub max_frames_per_read: usize,
    /// Upper bound on the size of one outgoing frame
    pub max_frame_bytes: usize,
    /// Ticks after which an unanswered request fails. None waits forever.
    pub request_timeout_ticks: Option<Tick>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_frames_per_read: 40,
            max_frame_bytes: 16 * 1024,
            request_timeout_ticks: None,
        }
    }
}
