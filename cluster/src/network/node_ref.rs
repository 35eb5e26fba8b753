use arbor_server::PeerKey;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerKey(pub(crate) u16);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientKey(pub(crate) u16);

/// Route to a process: this process itself, the server at the other end of
/// one of our client sessions, or a peer connected to one of our servers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Local,
    Client(ClientKey),
    Peer(ServerKey, PeerKey),
}
