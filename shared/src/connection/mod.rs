mod connection;
mod connection_config;
mod error;

pub use connection::Connection;
pub use connection_config::ConnectionConfig;
pub use error::ConnectionError;
