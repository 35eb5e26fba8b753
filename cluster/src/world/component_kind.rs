/// Behaviour attached to an entity. Inbound entity messages are dispatched
/// to the handlers registered for each kind the target entity carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Peer identity handshake, present on the process root
    Network,
    /// Cluster join protocol, present on the process root
    ClusterNode,
    ClusterObject,
    /// Application defined behaviour
    Custom(u16),
}
