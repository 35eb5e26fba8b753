use log::{info, warn};

use arbor_shared::{Identity, PeerAddress};

use crate::{
    error::ClusterError,
    messages::ClusterJoinResponse,
    network::NodeRef,
    node::NodeState,
    object::{install_object, release_node},
    process::{Context, ProcessEvent},
    tasks::JoinClusterTask,
};

/// Starts this process as the cluster root. The root owns the root cluster
/// object and is its own first peer, so it is ready right away.
pub(crate) fn host(ctx: &mut Context) -> Result<(), ClusterError> {
    if ctx.cluster.state() != NodeState::Idle {
        return Err(ClusterError::AlreadyStarted);
    }
    let advertise = ctx.cluster.config().advertise.clone();
    ctx.network.host_root(&advertise)?;

    let manager_id = ctx.network.new_identity()?;
    let root_object_id = ctx.network.new_identity_under(&manager_id)?;
    install_roots(ctx, manager_id, root_object_id)?;

    ctx.cluster
        .add_peer(Identity::ROOT, Some(advertise), Some(NodeRef::Local));
    ctx.cluster.set_state(NodeState::Ready);
    ctx.push_event(ProcessEvent::ClusterInitialized {
        peer_id: Identity::ROOT,
    });
    info!("Cluster root ready, root object is {}", root_object_id);
    Ok(())
}

/// Opens this process's own server session and connects to the root. The
/// join itself runs once the root has handed out our identity.
pub(crate) fn join(ctx: &mut Context, root_address: &PeerAddress) -> Result<(), ClusterError> {
    if ctx.cluster.state() != NodeState::Idle {
        return Err(ClusterError::AlreadyStarted);
    }
    let advertise = ctx.cluster.config().advertise.clone();
    ctx.network.listen(&advertise)?;
    ctx.network.connect_parent(root_address)?;
    ctx.cluster.set_state(NodeState::ConnectingToCluster);
    info!(
        "Joining cluster at {}, advertising {}",
        root_address, advertise
    );
    Ok(())
}

/// Applies the root's answer to our join request: connects to every
/// listed peer but the root, installs the shared roots and lists ourselves.
pub(crate) fn finish_join(
    ctx: &mut Context,
    response: ClusterJoinResponse,
) -> Result<Identity, ClusterError> {
    let peer_id = ctx.network.peer_id().ok_or(ClusterError::NotReady)?;
    let parent = ctx
        .network
        .parent_client()
        .ok_or(ClusterError::NotReady)?;

    for (position, info) in response.nodes.iter().enumerate() {
        let advertise = info.advertise();
        if position == 0 {
            // the root, already connected
            ctx.cluster
                .add_peer(info.id, advertise, Some(NodeRef::Client(parent)));
            continue;
        }
        let node = match &advertise {
            Some(address) => match ctx.network.connect_sibling(address, info.id) {
                Ok(client) => Some(NodeRef::Client(client)),
                Err(error) => {
                    warn!("Could not connect to peer {} at {}: {}", info.id, address, error);
                    None
                }
            },
            None => {
                warn!("Peer {} advertises no address and stays unreachable", info.id);
                None
            }
        };
        ctx.cluster.add_peer(info.id, advertise, node);
    }

    install_roots(ctx, response.object_manager_id, response.root_object_id)?;
    let advertise = ctx.cluster.config().advertise.clone();
    ctx.cluster
        .add_peer(peer_id, Some(advertise), Some(NodeRef::Local));
    ctx.cluster.set_state(NodeState::Ready);
    ctx.push_event(ProcessEvent::ClusterInitialized { peer_id });
    info!(
        "Joined cluster as {} with {} peers",
        peer_id,
        ctx.cluster.peers().len()
    );
    Ok(peer_id)
}

fn install_roots(
    ctx: &mut Context,
    manager_id: Identity,
    root_object_id: Identity,
) -> Result<(), ClusterError> {
    let root = ctx.world.root();
    let manager = ctx.world.spawn(root, "ClusterObjectManager")?;
    ctx.world.set_identity(manager, manager_id)?;
    let root_object = install_object(ctx, manager, "Root", root_object_id, Identity::ROOT)?;
    ctx.cluster.set_roots(manager, root_object.entity);
    Ok(())
}

/// Cluster node side of this tick's process events
pub(crate) fn react(ctx: &mut Context, events: &[ProcessEvent]) {
    for event in events {
        match event {
            ProcessEvent::AuthorizedFromServer { client, peer_id } => {
                if ctx.network.parent_client() == Some(*client)
                    && ctx.cluster.state() == NodeState::ConnectingToCluster
                {
                    info!("Authorized as {}, requesting to join", peer_id);
                    let root = ctx.world.root();
                    ctx.spawn(root, JoinClusterTask::new());
                }
            }
            ProcessEvent::PeerAuthorized { node, peer_id } => {
                let NodeRef::Peer(server, _) = node else {
                    continue;
                };
                if ctx.network.default_server() == Some(*server) {
                    ctx.cluster.add_peer(*peer_id, None, Some(*node));
                }
            }
            ProcessEvent::PeerDisconnected { node, .. } => {
                release_node(ctx, *node);
                ctx.cluster.forget_node(*node);
            }
            ProcessEvent::DisconnectedFromServer { client } => {
                let node = NodeRef::Client(*client);
                release_node(ctx, node);
                ctx.cluster.forget_node(node);
                if ctx.network.parent_client() == Some(*client)
                    && ctx.cluster.state() == NodeState::ConnectingToCluster
                {
                    warn!("Lost the root before the join completed");
                    ctx.cluster.set_state(NodeState::Idle);
                }
            }
            _ => {}
        }
    }
}
