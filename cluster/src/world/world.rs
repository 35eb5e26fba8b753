use std::collections::HashMap;

use log::trace;

use arbor_shared::Identity;

use crate::{
    error::ClusterError,
    world::{ComponentKind, EntityKey},
};

struct EntityRecord {
    name: String,
    parent: Option<EntityKey>,
    children: HashMap<String, EntityKey>,
    identity: Option<Identity>,
    components: Vec<ComponentKind>,
}

struct Slot {
    generation: u32,
    record: Option<EntityRecord>,
}

/// Arena of entities forming one tree. Children are unique by name under
/// their parent, and an identity names at most one entity.
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_identity: HashMap<Identity, EntityKey>,
    root: EntityKey,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a world holding only the process root, named by `Identity::ROOT`
    pub fn new() -> Self {
        let root = EntityKey::new(0, 0);
        let mut by_identity = HashMap::new();
        by_identity.insert(Identity::ROOT, root);
        Self {
            slots: vec![Slot {
                generation: 0,
                record: Some(EntityRecord {
                    name: "Root".to_string(),
                    parent: None,
                    children: HashMap::new(),
                    identity: Some(Identity::ROOT),
                    components: vec![ComponentKind::Network, ComponentKind::ClusterNode],
                }),
            }],
            free: Vec::new(),
            by_identity,
            root,
        }
    }

    pub fn root(&self) -> EntityKey {
        self.root
    }

    pub fn spawn(&mut self, parent: EntityKey, name: &str) -> Result<EntityKey, ClusterError> {
        let parent_record = self
            .record(parent)
            .ok_or(ClusterError::ObjectNotFound { entity: parent })?;
        if parent_record.children.contains_key(name) {
            return Err(ClusterError::ChildAlreadyExists {
                name: name.to_string(),
            });
        }

        let record = EntityRecord {
            name: name.to_string(),
            parent: Some(parent),
            children: HashMap::new(),
            identity: None,
            components: Vec::new(),
        };
        let key = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.record = Some(record);
                EntityKey::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                EntityKey::new((self.slots.len() - 1) as u32, 0)
            }
        };
        if let Some(parent_record) = self.record_mut(parent) {
            parent_record.children.insert(name.to_string(), key);
        }
        trace!("Spawned entity {:?} '{}' under {:?}", key, name, parent);
        Ok(key)
    }

    /// Despawns the entity and its whole subtree, returning every key removed
    pub fn despawn(&mut self, key: EntityKey) -> Vec<EntityKey> {
        if key == self.root || !self.is_alive(key) {
            return Vec::new();
        }
        if let Some(parent) = self.parent(key) {
            let name = self.name(key).map(str::to_string);
            if let (Some(parent_record), Some(name)) = (self.record_mut(parent), name) {
                parent_record.children.remove(&name);
            }
        }

        let mut removed = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index()];
            if let Some(record) = slot.record.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index() as u32);
                if let Some(identity) = record.identity {
                    self.by_identity.remove(&identity);
                }
                stack.extend(record.children.values().copied());
                removed.push(current);
            }
        }
        removed
    }

    pub fn is_alive(&self, key: EntityKey) -> bool {
        self.record(key).is_some()
    }

    pub fn name(&self, key: EntityKey) -> Option<&str> {
        self.record(key).map(|record| record.name.as_str())
    }

    pub fn parent(&self, key: EntityKey) -> Option<EntityKey> {
        self.record(key).and_then(|record| record.parent)
    }

    pub fn child(&self, key: EntityKey, name: &str) -> Option<EntityKey> {
        self.record(key)
            .and_then(|record| record.children.get(name).copied())
    }

    pub fn children(&self, key: EntityKey) -> Vec<EntityKey> {
        self.record(key)
            .map(|record| record.children.values().copied().collect())
            .unwrap_or_default()
    }

    pub fn identity(&self, key: EntityKey) -> Option<Identity> {
        self.record(key).and_then(|record| record.identity)
    }

    /// Names the entity with `identity`. An entity's identity never changes
    /// once set.
    pub fn set_identity(&mut self, key: EntityKey, identity: Identity) -> Result<(), ClusterError> {
        if let Some(existing) = self.by_identity.get(&identity) {
            if *existing != key {
                return Err(ClusterError::IdentityInUse { identity });
            }
        }
        let record = self
            .record_mut(key)
            .ok_or(ClusterError::ObjectNotFound { entity: key })?;
        if let Some(current) = record.identity {
            if current != identity {
                return Err(ClusterError::IdentityInUse { identity: current });
            }
        }
        record.identity = Some(identity);
        self.by_identity.insert(identity, key);
        Ok(())
    }

    /// Live entity named by `identity`, if any
    pub fn entity_of(&self, identity: &Identity) -> Option<EntityKey> {
        self.by_identity.get(identity).copied()
    }

    pub fn add_component(
        &mut self,
        key: EntityKey,
        component: ComponentKind,
    ) -> Result<(), ClusterError> {
        let record = self
            .record_mut(key)
            .ok_or(ClusterError::ObjectNotFound { entity: key })?;
        if !record.components.contains(&component) {
            record.components.push(component);
        }
        Ok(())
    }

    pub fn has_component(&self, key: EntityKey, component: ComponentKind) -> bool {
        self.record(key)
            .map(|record| record.components.contains(&component))
            .unwrap_or(false)
    }

    pub fn components(&self, key: EntityKey) -> &[ComponentKind] {
        self.record(key)
            .map(|record| record.components.as_slice())
            .unwrap_or(&[])
    }

    pub fn entities_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.record.is_some()).count()
    }

    fn record(&self, key: EntityKey) -> Option<&EntityRecord> {
        self.slots
            .get(key.index())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.record.as_ref())
    }

    fn record_mut(&mut self, key: EntityKey) -> Option<&mut EntityRecord> {
        self.slots
            .get_mut(key.index())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.record.as_mut())
    }
}
