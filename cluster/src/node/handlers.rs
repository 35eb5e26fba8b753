use log::info;

use arbor_shared::Message;

use crate::{
    error::{ClusterError, HandlerError},
    handlers::HandlerRegistry,
    messages::{ClusterJoinResponse, NodeInfo, RequestClusterJoin},
    network::Inbound,
    process::Context,
    world::{ComponentKind, EntityKey},
};

pub(crate) fn register_handlers(registry: &mut HandlerRegistry) {
    registry.insert(
        ComponentKind::ClusterNode,
        RequestClusterJoin::KIND,
        on_request_cluster_join,
    );
}

/// Answers a joining node with the shared roots and the roster as it stood
/// before the join, then records the joiner with the address it advertised.
fn on_request_cluster_join(
    ctx: &mut Context,
    _: EntityKey,
    inbound: &Inbound,
) -> Result<(), HandlerError> {
    let response_id = inbound.expect_response_id()?;
    let request = inbound.read::<RequestClusterJoin>()?;
    let joiner = ctx
        .network
        .node_peer_id(inbound.origin)
        .ok_or(HandlerError::UnknownOrigin {
            origin: inbound.origin,
        })?;
    if !ctx.cluster.is_ready() {
        return Err(ClusterError::NotReady.into());
    }

    let object_manager_id = ctx
        .cluster
        .manager()
        .and_then(|entity| ctx.world.identity(entity))
        .ok_or(ClusterError::NotReady)?;
    let root_object_id = ctx
        .cluster
        .root_object()
        .and_then(|entity| ctx.world.identity(entity))
        .ok_or(ClusterError::NotReady)?;
    let nodes = ctx
        .cluster
        .peers()
        .iter()
        .filter(|peer| peer.id != joiner)
        .map(|peer| NodeInfo::new(peer.id, peer.advertise.as_ref()))
        .collect();

    ctx.network.respond(
        inbound.origin,
        response_id,
        &ClusterJoinResponse {
            object_manager_id,
            root_object_id,
            nodes,
        },
    )?;

    let advertise = request.advertise();
    info!("{} joined the cluster, reachable at {:?}", joiner, advertise);
    ctx.cluster.add_peer(joiner, advertise, Some(inbound.origin));
    Ok(())
}
