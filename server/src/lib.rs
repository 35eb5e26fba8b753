//! # Arbor Server
//! The server role of an arbor session: accepts links from any number of
//! peers, reads their events in bounded batches, fans outbound events out to
//! them and correlates the requests it sends with their responses.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod transport {
    pub use arbor_shared::transport::{Link, Listener, Transport, TransportError};

    cfg_if! {
        if #[cfg(feature = "transport_tcp")] {
            pub use arbor_shared::transport::tcp;
        }
    }
}

mod error;
mod events;
mod peer;
mod session;

pub use error::ServerError;
pub use events::{
    ConnectEvent, DisconnectEvent, ErrorEvent, NetworkEventReceived, ServerEvent, ServerEvents,
};
pub use peer::{PeerKey, ServerPeer};
pub use session::ServerSession;
