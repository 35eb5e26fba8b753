use thiserror::Error;

use arbor_client::ClientError;
use arbor_server::ServerError;
use arbor_shared::{
    Identity, IdentityError, MessageKind, ProtocolError, RequestError, TransportError,
};

use crate::{network::NodeRef, world::EntityKey};

/// Errors surfaced by cluster operations and tasks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// Entity is not alive or carries no cluster object
    #[error("Entity {entity:?} is not a live cluster object")]
    ObjectNotFound { entity: EntityKey },

    /// Object is owned by another peer
    #[error("Object {identity} is owned by {owner}, not by this process")]
    NotOwner { identity: Identity, owner: Identity },

    /// Peer identity is not part of the cluster roster
    #[error("Peer {peer_id} is not in the cluster roster. It may not have joined yet")]
    UnknownPeer { peer_id: Identity },

    /// Node has no open session
    #[error("Node {node:?} has no open session")]
    UnknownNode { node: NodeRef },

    /// Sibling with the same name already exists
    #[error("A child named '{name}' already exists under this parent. Names are unique among siblings")]
    ChildAlreadyExists { name: String },

    /// Identity already names another local entity
    #[error("Identity {identity} is already attached to another entity")]
    IdentityInUse { identity: Identity },

    /// Owner answered a lock request with a failure
    #[error("Lock on {identity} was rejected by its owner")]
    LockRejected { identity: Identity },

    /// Owner refused an unlock because the requester does not hold the lock
    #[error("Unlock on {identity} was rejected, this process does not hold the lock")]
    NotLocker { identity: Identity },

    /// Operation needs a peer identity or a joined cluster
    #[error("Process has not joined a cluster yet. Wait for ClusterInitialized before issuing cluster operations")]
    NotReady,

    /// Operation needs a listening server session
    #[error("Process has no listening server session")]
    NoServerSession,

    /// Process already hosts or joins a cluster
    #[error("Process has already started hosting or joining a cluster")]
    AlreadyStarted,

    /// Sub-task finished without leaving a result behind
    #[error("Task '{task}' finished without a result")]
    NoResult { task: &'static str },

    /// Message kind was never registered with the protocol
    #[error("Message kind {net_id} is not registered with the protocol")]
    UnregisteredMessage { net_id: u16 },

    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Server session error: {0}")]
    Server(#[from] ServerError),

    #[error("Client session error: {0}")]
    Client(#[from] ClientError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ClusterError {
    pub(crate) fn unregistered(kind: MessageKind) -> Self {
        Self::UnregisteredMessage {
            net_id: kind.net_id(),
        }
    }
}

/// Errors raised while dispatching an inbound entity message to a handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Payload did not decode as the handler's message type
    #[error("Payload of message kind {net_id} could not be decoded")]
    Malformed { net_id: u16 },

    /// Handler needs a response id but the message was sent as plain
    #[error("Message kind {net_id} expects a response but was sent without a response id")]
    NotARequest { net_id: u16 },

    /// Another handler is already registered for this component and kind
    #[error("A handler for message kind {net_id} is already registered on this component")]
    DuplicateHandler { net_id: u16 },

    /// Origin of the message has no known peer identity
    #[error("Origin {origin:?} has not been assigned a peer identity")]
    UnknownOrigin { origin: NodeRef },

    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),
}
