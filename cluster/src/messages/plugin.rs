use arbor_shared::{Protocol, ProtocolPlugin};

use crate::messages::{
    Ack, CancelLock, ClusterJoinResponse, CreateChild, CreateChildResponse, GetChild,
    GetChildResponse, LockRequest, PeerIdResponse, RegisterPeerId, RequestClusterJoin,
    RequestPeerId, UnlockRequest,
};

/// Registers every message the cluster protocol exchanges
pub struct ClusterPlugin;

impl ProtocolPlugin for ClusterPlugin {
    fn build(&self, protocol: &mut Protocol) {
        protocol
            .add_message::<RequestPeerId>()
            .add_message::<RegisterPeerId>()
            .add_message::<PeerIdResponse>()
            .add_message::<RequestClusterJoin>()
            .add_message::<ClusterJoinResponse>()
            .add_message::<LockRequest>()
            .add_message::<UnlockRequest>()
            .add_message::<Ack>()
            .add_message::<GetChild>()
            .add_message::<GetChildResponse>()
            .add_message::<CreateChild>()
            .add_message::<CreateChildResponse>()
            .add_message::<CancelLock>();
    }
}
