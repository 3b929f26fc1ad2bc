use crate::{
    bytes::ByteWriter,
    component::SyncSet,
    message::{write_messages, CrdtMessage},
};

use super::{net_entity_map::NetEntityMap, world::World};

/// Every current value in every synchronized entity's sync set, as
/// network-form put messages stamped with their live timestamps. This is
/// the full-state response the oldest peer sends to a newcomer; applying it
/// over existing state is safe because last-write-wins resolution is
/// idempotent.
pub fn full_state_messages(world: &World, map: &NetEntityMap) -> Vec<CrdtMessage> {
    let mut messages = Vec::new();
    for (entity, net_entity) in map.iter() {
        let Some(sync_set) = world.sync_set(*entity) else {
            continue;
        };

        // the marker travels first so the receiver learns the entity's
        // sync set before its values
        let mut kinds = vec![SyncSet::KIND];
        kinds.extend(sync_set.kinds().iter().copied());

        for kind in kinds {
            let Some(slot) = world.slot(*entity, &kind) else {
                continue;
            };
            let Some(value) = slot.value() else {
                continue;
            };
            let mut writer = ByteWriter::new();
            value.write(&mut writer);
            messages.push(CrdtMessage::PutComponentNetwork {
                entity: *net_entity,
                kind,
                timestamp: slot.timestamp(),
                payload: writer.to_bytes().into_boxed_slice(),
            });
        }
    }
    messages
}

/// Encoded form of [`full_state_messages`], ready for the chunker.
pub fn encode_full_state(world: &World, map: &NetEntityMap) -> Vec<u8> {
    write_messages(&full_state_messages(world, map))
}
