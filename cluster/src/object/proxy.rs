use log::debug;

use arbor_shared::Identity;

use crate::{
    error::ClusterError,
    object::{ClusterObject, ClusterObjectInfo},
    process::Context,
    world::{ComponentKind, EntityKey},
};

/// Spawns `name` under `parent` as a cluster object named by `identity`
pub(crate) fn install_object(
    ctx: &mut Context,
    parent: EntityKey,
    name: &str,
    identity: Identity,
    owner: Identity,
) -> Result<ClusterObjectInfo, ClusterError> {
    if ctx.world.entity_of(&identity).is_some() {
        return Err(ClusterError::IdentityInUse { identity });
    }
    let entity = ctx.world.spawn(parent, name)?;
    if let Err(error) = ctx.world.set_identity(entity, identity) {
        ctx.world.despawn(entity);
        return Err(error);
    }
    ctx.world.add_component(entity, ComponentKind::ClusterObject)?;
    ctx.objects.insert(entity, ClusterObject::new(owner));
    Ok(ClusterObjectInfo {
        entity,
        identity,
        owner,
    })
}

/// Local stand-in for an object another process reported. Reuses the entity
/// if one already carries `identity`.
pub(crate) fn materialize(
    ctx: &mut Context,
    parent: EntityKey,
    name: &str,
    identity: Identity,
    owner: Identity,
) -> Result<ClusterObjectInfo, ClusterError> {
    if let Some(entity) = ctx.world.entity_of(&identity) {
        if let Some(info) = ctx.object_info(entity) {
            return Ok(info);
        }
    }
    debug!("Materializing proxy {} ({}) owned by {}", name, identity, owner);
    install_object(ctx, parent, name, identity, owner)
}
