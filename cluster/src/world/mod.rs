mod component_kind;
mod entity_key;
mod world;

pub use component_kind::ComponentKind;
pub use entity_key::EntityKey;
pub use world::World;
