//! # Arbor Cluster
//! Processes joining one tree of addressable objects. Every object is owned
//! by exactly one process, can be looked up or created from any process, and
//! carries a cooperative lock granted in request order. All multi-step
//! protocols run as tasks on a single-threaded scheduler, stepped once per
//! `Process::update`.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod transport {
    pub use arbor_shared::transport::{Link, Listener, Transport, TransportError};

    cfg_if! {
        if #[cfg(feature = "transport_tcp")] {
            pub use arbor_shared::transport::tcp;
        }
    }
}

pub mod messages;
pub mod tasks;

mod config;
mod error;
mod handlers;
mod network;
mod node;
mod object;
mod process;
mod scheduler;
mod world;

pub use arbor_shared::{
    ConnectionConfig, Identity, IdentityKind, Message, MessageKind, Outcome, PeerAddress,
    Protocol, ProtocolError, RequestError, ResponseId, RpcEvent, RpcParam, Serde, SerdeErr,
    SyncEvent, Tick, Vec2, WireReader, WireWrite,
};

pub use config::ClusterConfig;
pub use error::{ClusterError, HandlerError};
pub use handlers::{Handler, HandlerRegistry};
pub use network::{ClientKey, Inbound, NetworkController, NodeRef, ServerKey};
pub use node::{ClusterNode, ClusterPeer, NodeState};
pub use object::{ClusterObject, ClusterObjectInfo, LockWaiter, UnlockOutcome};
pub use process::{Context, Process, ProcessEvent};
pub use scheduler::{Scheduler, Step, Task, TaskContext, TaskKey};
pub use tasks::TaskResult;
pub use world::{ComponentKind, EntityKey, World};
