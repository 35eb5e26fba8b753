use std::collections::HashMap;

use crate::{
    network::NetworkController,
    node::ClusterNode,
    object::{ClusterObject, ClusterObjectInfo},
    process::ProcessEvent,
    scheduler::{Task, TaskContext},
    world::{EntityKey, World},
};

/// Everything a handler or task may touch. Passed explicitly, there is no
/// process-wide state.
pub struct Context {
    pub world: World,
    pub network: NetworkController,
    pub cluster: ClusterNode,
    /// Cluster object state, keyed by the entity carrying the component
    pub objects: HashMap<EntityKey, ClusterObject>,
    pub(crate) events: Vec<ProcessEvent>,
    spawned: Vec<(EntityKey, Box<dyn Task<Context>>)>,
}

impl Context {
    pub(crate) fn new(network: NetworkController, cluster: ClusterNode) -> Self {
        Self {
            world: World::new(),
            network,
            cluster,
            objects: HashMap::new(),
            events: Vec::new(),
            spawned: Vec::new(),
        }
    }

    /// Starts `task` on the next scheduler tick, tied to the lifetime of `owner`
    pub fn spawn<T: Task<Context> + 'static>(&mut self, owner: EntityKey, task: T) {
        self.spawned.push((owner, Box::new(task)));
    }

    /// Removes an entity, its descendants and their cluster object state.
    /// Tasks owned by any of them stop on the next tick.
    pub fn despawn(&mut self, entity: EntityKey) {
        for removed in self.world.despawn(entity) {
            self.objects.remove(&removed);
        }
    }

    pub fn push_event(&mut self, event: ProcessEvent) {
        self.events.push(event);
    }

    pub fn object(&self, entity: EntityKey) -> Option<&ClusterObject> {
        self.objects.get(&entity)
    }

    /// Identity and owner of a live cluster object
    pub fn object_info(&self, entity: EntityKey) -> Option<ClusterObjectInfo> {
        let object = self.objects.get(&entity)?;
        let identity = self.world.identity(entity)?;
        Some(ClusterObjectInfo {
            entity,
            identity,
            owner: object.owner(),
        })
    }

    /// Whether this process owns the object on `entity`
    pub fn owns(&self, entity: EntityKey) -> bool {
        match (self.objects.get(&entity), self.network.peer_id()) {
            (Some(object), Some(peer_id)) => object.owner() == peer_id,
            _ => false,
        }
    }
}

impl TaskContext for Context {
    fn is_alive(&self, owner: EntityKey) -> bool {
        self.world.is_alive(owner)
    }

    fn take_spawned(&mut self) -> Vec<(EntityKey, Box<dyn Task<Self>>)> {
        std::mem::take(&mut self.spawned)
    }
}
