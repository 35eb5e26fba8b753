mod child;
mod join;
mod lock;
mod peer;
mod plugin;

pub use child::{ChildInfo, CreateChild, CreateChildResponse, GetChild, GetChildResponse};
pub use join::{ClusterJoinResponse, NodeInfo, RequestClusterJoin};
pub use lock::{Ack, CancelLock, LockRequest, UnlockRequest};
pub use peer::{PeerIdResponse, RegisterPeerId, RequestPeerId};
pub use plugin::ClusterPlugin;

/// Kinds below this value are reserved for the cluster protocol
pub const FIRST_APPLICATION_KIND: u16 = 100;
