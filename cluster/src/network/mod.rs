mod controller;
mod handshake;
mod inbound;
mod loopback;
mod node_ref;

pub use controller::NetworkController;
pub(crate) use handshake::register_handlers;
pub use inbound::Inbound;
pub use node_ref::{ClientKey, NodeRef, ServerKey};
