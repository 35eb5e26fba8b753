//! # Arbor Client
//! The client role of an arbor session: a single outbound link to a server
//! session, with its own request table for the correlated requests it sends.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod transport {
    pub use arbor_shared::transport::{Link, Transport, TransportError};

    cfg_if! {
        if #[cfg(feature = "transport_tcp")] {
            pub use arbor_shared::transport::tcp;
        }
    }
}

mod error;
mod events;
mod session;

pub use error::ClientError;
pub use events::{
    ClientEvent, ClientEvents, ConnectEvent, DisconnectEvent, ErrorEvent, NetworkEventReceived,
};
pub use session::ClientSession;
