mod peer_key;
mod server_peer;

pub use peer_key::PeerKey;
pub use server_peer::ServerPeer;
