use std::collections::{HashMap, HashSet};

use crate::component::NetworkIdentity;

use super::{
    entity::Entity,
    error::EntityDoesNotExistError,
    net_entity::{NetworkEntity, NetworkId},
    world::World,
};

/// Bidirectional index between process-local entity handles and their
/// portable `(network-id, entity-id)` identities.
///
/// The mapping itself lives on each entity as a [`NetworkIdentity`]
/// component; this structure is the secondary index that makes lookups O(1)
/// in both directions. Tombstones record pairs whose originating entity was
/// removed; a pair is never reused for the lifetime of the session.
pub struct NetEntityMap {
    net_to_local: HashMap<NetworkEntity, Entity>,
    local_to_net: HashMap<Entity, NetworkEntity>,
    tombstones: HashSet<NetworkEntity>,
}

impl NetEntityMap {
    pub fn new() -> Self {
        Self {
            net_to_local: HashMap::new(),
            local_to_net: HashMap::new(),
            tombstones: HashSet::new(),
        }
    }

    /// Give a locally authored entity a portable identity under the
    /// authoring peer's network id.
    ///
    /// # Panics
    /// Panics if the entity is already mapped or the pair was used before.
    pub fn register_local(
        &mut self,
        world: &mut World,
        entity: Entity,
        network_id: NetworkId,
    ) -> NetworkEntity {
        let net_entity = NetworkEntity::new(network_id, entity.id());
        if self.local_to_net.contains_key(&entity) {
            panic!("cannot overwrite mapping for entity: {:?}", entity);
        }
        if self.net_to_local.contains_key(&net_entity) || self.tombstones.contains(&net_entity) {
            panic!("network entity pair already used: {:?}", net_entity);
        }

        // the authoring peer is the creator
        world.insert_component_silent(
            entity,
            NetworkIdentity::KIND,
            Box::new(NetworkIdentity::new(net_entity, Some(network_id))),
        );
        self.net_to_local.insert(net_entity, entity);
        self.local_to_net.insert(entity, net_entity);
        net_entity
    }

    /// Resolve a portable identity to the local entity that represents it,
    /// allocating a fresh one on first sight. On the server, `created_by`
    /// records the sending peer for later permission checks.
    ///
    /// # Panics
    /// Panics if the pair is tombstoned; callers check
    /// [`is_deleted`](Self::is_deleted) before resolving.
    pub fn resolve_or_create(
        &mut self,
        world: &mut World,
        net_entity: NetworkEntity,
        created_by: Option<NetworkId>,
    ) -> Entity {
        if self.tombstones.contains(&net_entity) {
            panic!(
                "cannot resolve deleted network entity: {:?}",
                net_entity
            );
        }
        if let Some(entity) = self.net_to_local.get(&net_entity) {
            return *entity;
        }
        let entity = world.spawn();
        world.insert_component_silent(
            entity,
            NetworkIdentity::KIND,
            Box::new(NetworkIdentity::new(net_entity, created_by)),
        );
        self.net_to_local.insert(net_entity, entity);
        self.local_to_net.insert(entity, net_entity);
        entity
    }

    pub fn local_entity(
        &self,
        net_entity: &NetworkEntity,
    ) -> Result<Entity, EntityDoesNotExistError> {
        self.net_to_local
            .get(net_entity)
            .copied()
            .ok_or(EntityDoesNotExistError)
    }

    /// Portable identity of a local entity, or `None` if the entity has no
    /// mapping and is therefore local-only.
    pub fn network_entity(&self, entity: &Entity) -> Option<NetworkEntity> {
        self.local_to_net.get(entity).copied()
    }

    pub fn contains_local(&self, entity: &Entity) -> bool {
        self.local_to_net.contains_key(entity)
    }

    pub fn is_deleted(&self, net_entity: &NetworkEntity) -> bool {
        self.tombstones.contains(net_entity)
    }

    /// Peer that first introduced the entity to the server, read back from
    /// the mapping component.
    pub fn created_by(&self, world: &World, entity: Entity) -> Option<NetworkId> {
        world
            .component::<NetworkIdentity>(entity, &NetworkIdentity::KIND)?
            .created_by()
    }

    /// Drop the mapping for a removed entity and tombstone its pair so it
    /// can never be reintroduced.
    pub fn release(&mut self, entity: &Entity) -> Option<NetworkEntity> {
        let net_entity = self.local_to_net.remove(entity)?;
        self.net_to_local.remove(&net_entity);
        self.tombstones.insert(net_entity);
        Some(net_entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Entity, &NetworkEntity)> {
        self.local_to_net.iter()
    }

    pub fn len(&self) -> usize {
        self.local_to_net.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local_to_net.is_empty()
    }
}

impl Default for NetEntityMap {
    fn default() -> Self {
        Self::new()
    }
}
