mod server_events;

pub use server_events::{
    ConnectEvent, DisconnectEvent, ErrorEvent, NetworkEventReceived, ServerEvent, ServerEvents,
};
