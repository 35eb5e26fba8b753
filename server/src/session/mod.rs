mod server_session;

pub use server_session::ServerSession;
