use log::info;

use arbor_shared::Message;

use crate::{
    error::HandlerError,
    handlers::HandlerRegistry,
    messages::{PeerIdResponse, RegisterPeerId, RequestPeerId},
    network::Inbound,
    process::{Context, ProcessEvent},
    world::{ComponentKind, EntityKey},
};

pub(crate) fn register_handlers(registry: &mut HandlerRegistry) {
    registry.insert(ComponentKind::Network, RequestPeerId::KIND, on_request_peer_id);
    registry.insert(ComponentKind::Network, RegisterPeerId::KIND, on_register_peer_id);
}

/// A new peer asks for an identity. It gets the next one under ours.
fn on_request_peer_id(
    ctx: &mut Context,
    _: EntityKey,
    inbound: &Inbound,
) -> Result<(), HandlerError> {
    let response_id = inbound.expect_response_id()?;
    inbound.read::<RequestPeerId>()?;

    let peer_id = ctx.network.assign_peer_id(inbound.origin)?;
    info!("Assigned identity {} to {:?}", peer_id, inbound.origin);
    ctx.network
        .respond(inbound.origin, response_id, &PeerIdResponse { peer_id })?;
    ctx.push_event(ProcessEvent::PeerAuthorized {
        node: inbound.origin,
        peer_id,
    });
    Ok(())
}

/// A peer that already has an identity opened another session to us
fn on_register_peer_id(
    ctx: &mut Context,
    _: EntityKey,
    inbound: &Inbound,
) -> Result<(), HandlerError> {
    let response_id = inbound.expect_response_id()?;
    let RegisterPeerId { peer_id } = inbound.read()?;

    ctx.network.register_peer_id(inbound.origin, peer_id)?;
    info!("Registered {:?} as {}", inbound.origin, peer_id);
    ctx.network
        .respond(inbound.origin, response_id, &PeerIdResponse { peer_id })?;
    ctx.push_event(ProcessEvent::PeerAuthorized {
        node: inbound.origin,
        peer_id,
    });
    Ok(())
}
