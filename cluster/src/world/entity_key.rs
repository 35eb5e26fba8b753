/// Generational index of an entity in a `World`. A key outlives its entity
/// safely: once the entity is despawned the key no longer resolves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    index: u32,
    generation: u32,
}

impl EntityKey {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }
}
