mod error;
mod message;
mod message_kinds;
mod rpc;

pub use error::MessageKindsError;
pub use message::Message;
pub use message_kinds::MessageKinds;
pub use rpc::RpcParam;
