pub mod helpers;

pub use helpers::*;
pub use local_transport::{LocalLink, LocalTransport};
pub use test_protocol::{protocol, register_greeting, Greeting, GreetingReply};
