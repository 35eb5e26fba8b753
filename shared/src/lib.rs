//! # Arbor Shared
//! Common functionality shared between arbor-server, arbor-client &
//! arbor-cluster crates: hierarchical identities, the wire events sessions
//! exchange, the message registry and per-session request correlation.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub use arbor_serde::{Serde, SerdeErr, Vec2, WireReader, WireWrite, WireWriter};

mod connection;
mod events;
mod identity;
mod messages;
mod protocol;
mod request;
mod types;

pub mod transport;

pub use connection::{Connection, ConnectionConfig, ConnectionError};
pub use events::{
    pack_frames, read_frame, EntityMessageEvent, EventError, ExecKind, NetworkEvent,
    ResponseEvent, RpcEvent, SyncEvent, MAX_PAYLOAD_BYTES, MAX_RPC_PARAMS,
};
pub use identity::{
    Identity, IdentityAllocator, IdentityError, IdentityKind, PeerIdentityAllocator,
    MAX_IDENTITY_DEPTH,
};
pub use messages::{Message, MessageKinds, MessageKindsError, RpcParam};
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin};
pub use request::{Outcome, RequestError, RequestTable, ResponseEnvelope, ResponseSlot};
pub use transport::{Link, Listener, Transport, TransportError};
pub use types::{MessageKind, PeerAddress, ResponseId, Tick};
