use arbor_shared::{Identity, RpcEvent, SyncEvent};

use crate::network::{ClientKey, NodeRef};

/// Something that happened to a process during one tick, queued for the
/// hosting application and for the cluster node
#[derive(Clone, Debug, PartialEq)]
pub enum ProcessEvent {
    /// A client session's link came up
    ConnectedToServer { client: ClientKey },
    /// A client session's link closed
    DisconnectedFromServer { client: ClientKey },
    /// The server behind a client session confirmed our identity
    AuthorizedFromServer { client: ClientKey, peer_id: Identity },
    /// A peer on one of our server sessions now has an identity
    PeerAuthorized { node: NodeRef, peer_id: Identity },
    /// A peer left one of our server sessions
    PeerDisconnected {
        node: NodeRef,
        peer_id: Option<Identity>,
    },
    /// This process finished hosting or joining and can use cluster objects
    ClusterInitialized { peer_id: Identity },
    Rpc { origin: NodeRef, rpc: RpcEvent },
    Synchronize { origin: NodeRef, sync: SyncEvent },
}
