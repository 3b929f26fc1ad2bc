use std::collections::HashMap;

use crate::{
    bytes::ByteWriter,
    component::{ComponentKind, SchemaError, SchemaRegistry, SyncComponent, SyncSet},
    lww::{self, Resolution, FIRST_WRITE_TIMESTAMP},
    message::CrdtMessage,
    types::Timestamp,
};

use super::entity::Entity;

/// Stored state for one (entity, component): the current value and the
/// logical clock of the write that produced it. A `None` value is a delete
/// tombstone, kept so a stale put cannot resurrect a removed component.
pub struct ComponentSlot {
    value: Option<Box<dyn SyncComponent>>,
    timestamp: Timestamp,
}

impl ComponentSlot {
    pub fn value(&self) -> Option<&dyn SyncComponent> {
        self.value.as_deref()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

#[derive(Default)]
struct EntityRecord {
    components: HashMap<ComponentKind, ComponentSlot>,
}

/// The local entity/component table, mutated only by the owning peer's
/// engine thread.
///
/// Mutations through the authoring API (`insert_component`,
/// `remove_component`, `despawn`) stamp fresh timestamps and queue outbound
/// messages; `apply_message` is the inbound path and applies remote writes
/// under last-write-wins without echoing them back out.
pub struct World {
    reserved_threshold: u32,
    next_entity_id: u32,
    entities: HashMap<Entity, EntityRecord>,
    outbox: Vec<CrdtMessage>,
}

impl World {
    /// `reserved_entity_threshold`: entity ids below this are reserved for
    /// host-internal use and never synchronized; fresh handles are
    /// allocated above it.
    pub fn new(reserved_entity_threshold: u32) -> Self {
        Self {
            reserved_threshold: reserved_entity_threshold,
            next_entity_id: reserved_entity_threshold,
            entities: HashMap::new(),
            outbox: Vec::new(),
        }
    }

    pub fn reserved_threshold(&self) -> u32 {
        self.reserved_threshold
    }

    pub fn spawn(&mut self) -> Entity {
        let entity = Entity::new(self.next_entity_id);
        // handles are never reused within a session
        self.next_entity_id += 1;
        self.entities.insert(entity, EntityRecord::default());
        entity
    }

    /// Create an entity on a host-reserved id, below the threshold.
    ///
    /// # Panics
    /// Panics if the id is not in the reserved range or already exists.
    pub fn spawn_reserved(&mut self, id: u32) -> Entity {
        if id >= self.reserved_threshold {
            panic!(
                "id {} is not reserved (threshold {})",
                id, self.reserved_threshold
            );
        }
        let entity = Entity::new(id);
        if self.entities.contains_key(&entity) {
            panic!("reserved entity already exists: {:?}", entity);
        }
        self.entities.insert(entity, EntityRecord::default());
        entity
    }

    pub fn contains(&self, entity: &Entity) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys().copied()
    }

    pub fn slot(&self, entity: Entity, kind: &ComponentKind) -> Option<&ComponentSlot> {
        self.entities.get(&entity)?.components.get(kind)
    }

    pub fn components_of(
        &self,
        entity: Entity,
    ) -> impl Iterator<Item = (&ComponentKind, &ComponentSlot)> {
        self.entities
            .get(&entity)
            .into_iter()
            .flat_map(|record| record.components.iter())
    }

    /// Current value of a component, downcast to its concrete type
    pub fn component<C: SyncComponent>(&self, entity: Entity, kind: &ComponentKind) -> Option<&C> {
        self.slot(entity, kind)?.value()?.downcast_ref::<C>()
    }

    pub fn sync_set(&self, entity: Entity) -> Option<&SyncSet> {
        self.component::<SyncSet>(entity, &SyncSet::KIND)
    }

    /// Declare which of an entity's components replicate. The marker itself
    /// is queued for transmission; it is the first message establishing
    /// the entity's sync set on remote peers.
    pub fn mark_synced(&mut self, entity: Entity, kinds: Vec<ComponentKind>) {
        self.insert_component(entity, SyncSet::KIND, Box::new(SyncSet::new(kinds)));
    }

    /// Authoring write: stores the value under a freshly bumped timestamp
    /// and queues a put message for the next outbound flush.
    ///
    /// # Panics
    /// Panics if the entity does not exist.
    pub fn insert_component(
        &mut self,
        entity: Entity,
        kind: ComponentKind,
        value: Box<dyn SyncComponent>,
    ) -> Timestamp {
        if !self.entities.contains_key(&entity) {
            panic!(
                "cannot insert component on entity which does not exist: {:?}",
                entity
            );
        }
        let timestamp = self.next_timestamp(entity, &kind);
        let mut writer = ByteWriter::new();
        value.write(&mut writer);
        let payload = writer.to_bytes().into_boxed_slice();
        self.store(entity, kind, Some(value), timestamp);
        self.outbox.push(CrdtMessage::PutComponent {
            entity,
            kind,
            timestamp,
            payload,
        });
        timestamp
    }

    /// Store a value without queueing an outbound message. Used for local
    /// bookkeeping components that never travel as puts of their own.
    pub(crate) fn insert_component_silent(
        &mut self,
        entity: Entity,
        kind: ComponentKind,
        value: Box<dyn SyncComponent>,
    ) {
        let timestamp = self.next_timestamp(entity, &kind);
        self.store(entity, kind, Some(value), timestamp);
    }

    /// Authoring delete of one component. Leaves a tombstone slot and
    /// queues a delete message. Returns false if there was nothing to
    /// remove.
    pub fn remove_component(&mut self, entity: Entity, kind: ComponentKind) -> bool {
        let Some(slot) = self.slot(entity, &kind) else {
            return false;
        };
        if slot.value.is_none() {
            return false;
        }
        let timestamp = slot.timestamp + 1;
        self.store(entity, kind, None, timestamp);
        self.outbox.push(CrdtMessage::DeleteComponent {
            entity,
            kind,
            timestamp,
        });
        true
    }

    /// Authoring removal of an entity and everything on it.
    ///
    /// # Panics
    /// Panics if the entity does not exist.
    pub fn despawn(&mut self, entity: Entity) {
        if self.entities.remove(&entity).is_none() {
            panic!("cannot despawn entity which does not exist: {:?}", entity);
        }
        self.outbox.push(CrdtMessage::DeleteEntity { entity });
    }

    /// Dry-run conflict resolution for an incoming local-form message,
    /// without touching stored state or decoding the payload.
    pub fn resolve(&self, message: &CrdtMessage) -> Resolution {
        match message {
            CrdtMessage::PutComponent {
                entity,
                kind,
                timestamp,
                ..
            }
            | CrdtMessage::DeleteComponent {
                entity,
                kind,
                timestamp,
            } => {
                let current = self
                    .slot(*entity, kind)
                    .map(|slot| (slot.timestamp, slot.value()));
                lww::resolve(false, current, *timestamp, None)
            }
            // delete-entity always wins
            CrdtMessage::DeleteEntity { .. } => Resolution::AcceptNewValue,
            _ => panic!(
                "cannot resolve message in network form: {:?}",
                message.message_type()
            ),
        }
    }

    /// Inbound path: validate the payload against its schema, resolve under
    /// last-write-wins, and mutate on an accepting outcome. `Err` means the
    /// payload was malformed; the caller drops the message. Never queues
    /// outbound messages.
    ///
    /// # Panics
    /// Panics if the message is still in network form; translate it with
    /// [`CrdtMessage::to_local_form`] first.
    pub fn apply_message(
        &mut self,
        registry: &SchemaRegistry,
        message: &CrdtMessage,
    ) -> Result<Resolution, SchemaError> {
        match message {
            CrdtMessage::PutComponent {
                entity,
                kind,
                timestamp,
                payload,
            } => {
                let value = registry.validate_payload(kind, payload)?;
                let current = self
                    .slot(*entity, kind)
                    .map(|slot| (slot.timestamp, slot.value()));
                let resolution = lww::resolve(false, current, *timestamp, Some(&*value));
                match resolution {
                    Resolution::AcceptNewValue => {
                        self.store(*entity, *kind, Some(value), *timestamp)
                    }
                    Resolution::AcceptTimestampOnly => {
                        self.bump_timestamp(*entity, kind, *timestamp)
                    }
                    Resolution::EntityDeleted | Resolution::RejectStale => {}
                }
                Ok(resolution)
            }
            CrdtMessage::DeleteComponent {
                entity,
                kind,
                timestamp,
            } => {
                let current = self
                    .slot(*entity, kind)
                    .map(|slot| (slot.timestamp, slot.value()));
                let resolution = lww::resolve(false, current, *timestamp, None);
                match resolution {
                    Resolution::AcceptNewValue => self.store(*entity, *kind, None, *timestamp),
                    Resolution::AcceptTimestampOnly => {
                        self.bump_timestamp(*entity, kind, *timestamp)
                    }
                    Resolution::EntityDeleted | Resolution::RejectStale => {}
                }
                Ok(resolution)
            }
            CrdtMessage::DeleteEntity { entity } => {
                // idempotent: removing an already-removed entity is a no-op
                self.entities.remove(entity);
                Ok(Resolution::AcceptNewValue)
            }
            _ => panic!(
                "cannot apply message in network form: {:?}",
                message.message_type()
            ),
        }
    }

    /// Drain the messages queued by the authoring API since the last call.
    pub fn take_outbox(&mut self) -> Vec<CrdtMessage> {
        std::mem::take(&mut self.outbox)
    }

    fn next_timestamp(&self, entity: Entity, kind: &ComponentKind) -> Timestamp {
        self.slot(entity, kind)
            .map(|slot| slot.timestamp + 1)
            .unwrap_or(FIRST_WRITE_TIMESTAMP)
    }

    fn store(
        &mut self,
        entity: Entity,
        kind: ComponentKind,
        value: Option<Box<dyn SyncComponent>>,
        timestamp: Timestamp,
    ) {
        let record = self.entities.entry(entity).or_default();
        record
            .components
            .insert(kind, ComponentSlot { value, timestamp });
    }

    fn bump_timestamp(&mut self, entity: Entity, kind: &ComponentKind, timestamp: Timestamp) {
        if let Some(record) = self.entities.get_mut(&entity) {
            if let Some(slot) = record.components.get_mut(kind) {
                slot.timestamp = timestamp;
            }
        }
    }
}
