mod cluster_node;
mod handlers;
mod lifecycle;

pub use cluster_node::{ClusterNode, ClusterPeer, NodeState};
pub(crate) use handlers::register_handlers;
pub(crate) use lifecycle::{finish_join, host, join, react};
