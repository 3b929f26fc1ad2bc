mod entity;
mod error;
mod net_entity;
mod net_entity_map;
mod snapshot;
#[allow(clippy::module_inception)]
mod world;

pub use entity::Entity;
pub use error::EntityDoesNotExistError;
pub use net_entity::{NetworkEntity, NetworkId};
pub use net_entity_map::NetEntityMap;
pub use snapshot::{encode_full_state, full_state_messages};
pub use world::{ComponentSlot, World};
