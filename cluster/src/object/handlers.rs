use log::{debug, info, warn};

use arbor_shared::Message;

use crate::{
    error::{ClusterError, HandlerError},
    handlers::HandlerRegistry,
    messages::{
        Ack, CancelLock, ChildInfo, CreateChild, CreateChildResponse, GetChild, GetChildResponse,
        LockRequest, UnlockRequest,
    },
    network::{Inbound, NodeRef},
    object::{install_object, LockWaiter, UnlockOutcome},
    process::Context,
    world::{ComponentKind, EntityKey},
};

pub(crate) fn register_handlers(registry: &mut HandlerRegistry) {
    let object = ComponentKind::ClusterObject;
    registry.insert(object, LockRequest::KIND, on_lock);
    registry.insert(object, UnlockRequest::KIND, on_unlock);
    registry.insert(object, CancelLock::KIND, on_cancel_lock);
    registry.insert(object, GetChild::KIND, on_get_child);
    registry.insert(object, CreateChild::KIND, on_create_child);
}

/// Requests for an object must reach its owner. Anything else is a routing
/// mistake on the sender's side.
fn check_owner(ctx: &Context, entity: EntityKey, inbound: &Inbound) -> Result<bool, HandlerError> {
    let object = ctx
        .object(entity)
        .ok_or(ClusterError::ObjectNotFound { entity })?;
    if ctx.owns(entity) {
        return Ok(true);
    }
    warn!(
        "{:?} sent message kind {} for {} to a process that does not own it (owner {})",
        inbound.origin,
        inbound.kind.net_id(),
        inbound.target,
        object.owner()
    );
    Ok(false)
}

fn on_lock(ctx: &mut Context, entity: EntityKey, inbound: &Inbound) -> Result<(), HandlerError> {
    let response_id = inbound.expect_response_id()?;
    inbound.read::<LockRequest>()?;
    if !check_owner(ctx, entity, inbound)? {
        ctx.network
            .respond(inbound.origin, response_id, &Ack { success: false })?;
        return Ok(());
    }

    let object = ctx
        .objects
        .get_mut(&entity)
        .ok_or(ClusterError::ObjectNotFound { entity })?;
    if object.lock(inbound.origin, response_id) {
        info!("{} locked by {:?}", inbound.target, inbound.origin);
        ctx.network
            .respond(inbound.origin, response_id, &Ack { success: true })?;
    } else {
        debug!(
            "{} is locked, {:?} waits behind {} others",
            inbound.target,
            inbound.origin,
            object.waiting() - 1
        );
    }
    Ok(())
}

fn on_unlock(ctx: &mut Context, entity: EntityKey, inbound: &Inbound) -> Result<(), HandlerError> {
    let response_id = inbound.expect_response_id()?;
    inbound.read::<UnlockRequest>()?;
    if !check_owner(ctx, entity, inbound)? {
        ctx.network
            .respond(inbound.origin, response_id, &Ack { success: false })?;
        return Ok(());
    }

    let object = ctx
        .objects
        .get_mut(&entity)
        .ok_or(ClusterError::ObjectNotFound { entity })?;
    match object.unlock(inbound.origin) {
        UnlockOutcome::NotLocker => {
            warn!(
                "{:?} tried to unlock {} without holding the lock",
                inbound.origin, inbound.target
            );
            ctx.network
                .respond(inbound.origin, response_id, &Ack { success: false })?;
            return Ok(());
        }
        UnlockOutcome::Released => {
            info!("{} unlocked by {:?}", inbound.target, inbound.origin);
        }
        UnlockOutcome::Handover(waiter) => {
            info!(
                "{} passed from {:?} to {:?}",
                inbound.target, inbound.origin, waiter.node
            );
            grant(ctx, waiter);
        }
    }
    ctx.network
        .respond(inbound.origin, response_id, &Ack { success: true })?;
    Ok(())
}

/// The sender gave up on one of its lock requests. Its queue entry goes, and
/// if that request held the lock, the next waiter is granted it.
fn on_cancel_lock(
    ctx: &mut Context,
    entity: EntityKey,
    inbound: &Inbound,
) -> Result<(), HandlerError> {
    let CancelLock { response_id } = inbound.read()?;
    if !check_owner(ctx, entity, inbound)? {
        return Ok(());
    }

    let object = ctx
        .objects
        .get_mut(&entity)
        .ok_or(ClusterError::ObjectNotFound { entity })?;
    debug!(
        "{:?} withdrew lock request {} on {}",
        inbound.origin, response_id, inbound.target
    );
    if let Some(waiter) = object.cancel(inbound.origin, response_id) {
        info!(
            "{} passed from cancelled {:?} to {:?}",
            inbound.target, inbound.origin, waiter.node
        );
        grant(ctx, waiter);
    }
    Ok(())
}

fn grant(ctx: &mut Context, waiter: LockWaiter) {
    if let Err(error) = ctx
        .network
        .respond(waiter.node, waiter.response_id, &Ack { success: true })
    {
        warn!("Could not grant lock to {:?}: {}", waiter.node, error);
    }
}

fn on_get_child(
    ctx: &mut Context,
    entity: EntityKey,
    inbound: &Inbound,
) -> Result<(), HandlerError> {
    let response_id = inbound.expect_response_id()?;
    let GetChild { name } = inbound.read()?;

    let child = if check_owner(ctx, entity, inbound)? {
        ctx.world
            .child(entity, &name)
            .and_then(|child| ctx.object_info(child))
            .map(|info| ChildInfo {
                id: info.identity,
                owner: info.owner,
            })
    } else {
        None
    };
    ctx.network
        .respond(inbound.origin, response_id, &GetChildResponse { child })?;
    Ok(())
}

fn on_create_child(
    ctx: &mut Context,
    entity: EntityKey,
    inbound: &Inbound,
) -> Result<(), HandlerError> {
    let response_id = inbound.expect_response_id()?;
    let CreateChild { name } = inbound.read()?;

    let child = if !check_owner(ctx, entity, inbound)? {
        None
    } else if ctx.world.child(entity, &name).is_some() {
        debug!("{} already has a child named '{}'", inbound.target, name);
        None
    } else {
        // the child belongs to whoever asked for it
        let owner = ctx
            .network
            .node_peer_id(inbound.origin)
            .ok_or(HandlerError::UnknownOrigin {
                origin: inbound.origin,
            })?;
        let identity = ctx.network.new_identity_under(&inbound.target)?;
        let info = install_object(ctx, entity, &name, identity, owner)?;
        info!(
            "Created {} '{}' under {} for {}",
            info.identity, name, inbound.target, owner
        );
        Some(info.identity)
    };
    ctx.network
        .respond(inbound.origin, response_id, &CreateChildResponse { child })?;
    Ok(())
}

/// Drops every trace of `node` from the lock queues of objects this process
/// owns. Locks it held pass to the next waiter, who is answered now.
pub(crate) fn release_node(ctx: &mut Context, node: NodeRef) {
    let Some(peer_id) = ctx.network.peer_id() else {
        return;
    };
    let mut granted = Vec::new();
    for object in ctx.objects.values_mut() {
        if object.owner() != peer_id {
            continue;
        }
        if let Some(waiter) = object.release_node(node) {
            granted.push(waiter);
        }
    }
    for waiter in granted {
        debug!("Lock released by departed {:?} goes to {:?}", node, waiter.node);
        grant(ctx, waiter);
    }
}
