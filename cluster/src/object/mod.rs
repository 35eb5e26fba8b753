mod cluster_object;
mod handlers;
mod proxy;

pub use cluster_object::{ClusterObject, ClusterObjectInfo, LockWaiter, UnlockOutcome};
pub(crate) use handlers::{register_handlers, release_node};
pub(crate) use proxy::{install_object, materialize};
