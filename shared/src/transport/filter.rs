use crate::{
    component::{NetworkIdentity, SyncSet},
    message::CrdtMessage,
    world::World,
};

/// Host-installed pre-send predicate. Returning false suppresses the
/// message before it reaches the wire; built-in eligibility checks run
/// first regardless.
pub type MessageFilter = Box<dyn Fn(&CrdtMessage) -> bool + Send + Sync>;

/// Whether a locally authored message is eligible for cross-peer
/// transmission: the entity must be outside the reserved range, and
/// component operations must address a kind in the entity's sync set, or
/// be the very first message establishing that set. Entity deletion is
/// always eligible. Everything else never leaves the process.
pub fn replication_eligible(world: &World, message: &CrdtMessage) -> bool {
    let Some(entity) = message.local_entity() else {
        // network-form messages have already been translated and vetted
        return true;
    };
    if entity.id() < world.reserved_threshold() {
        return false;
    }
    match message.component_kind() {
        None => true, // delete-entity
        Some(kind) => {
            if kind == SyncSet::KIND {
                return true;
            }
            // the mapping component is local bookkeeping, never a message
            if kind == NetworkIdentity::KIND {
                return false;
            }
            world
                .sync_set(entity)
                .map_or(false, |sync_set| sync_set.contains(&kind))
        }
    }
}
