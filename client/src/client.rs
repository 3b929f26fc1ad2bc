use std::collections::HashMap;
use std::time::Instant;

use log::{trace, warn};

use weft_shared::{
    collect_outbound, encode_frames, encode_full_state, is_oldest, Bootstrap, ComponentKind,
    CrdtMessage, Entity, Frame, MessageFilter, MessageReader, NetEntityMap, NetworkEntity,
    NetworkId, PacketReceiver, PacketSender, PeerJoinRecord, SchemaRegistry, SessionConfig, World,
};

use crate::events::ClientEvent;

/// A non-authoritative peer. Owns a replica of the shared world, translates
/// locally authored changes into network form on the way out, applies
/// remote changes under last-write-wins on the way in, and bootstraps full
/// state from the oldest connected peer on join.
///
/// Runs inside the host's per-frame update loop: call
/// [`tick`](Client::tick) once per frame.
pub struct Client {
    config: SessionConfig,
    registry: SchemaRegistry,
    world: World,
    net_map: NetEntityMap,
    network_id: NetworkId,
    join_timestamp: u64,
    bootstrap: Bootstrap,
    /// Join records of every known participant, this peer excluded
    peers: HashMap<NetworkId, PeerJoinRecord>,
    selections: HashMap<NetworkId, NetworkEntity>,
    sender: Box<dyn PacketSender>,
    receiver: Box<dyn PacketReceiver>,
    filter: Option<MessageFilter>,
}

impl Client {
    /// Attach to a connected transport, announce this peer, and request
    /// full state. `network_id` comes from the host's identity derivation;
    /// `join_timestamp` is this peer's wall-clock join time in
    /// milliseconds.
    pub fn connect(
        config: SessionConfig,
        registry: SchemaRegistry,
        network_id: NetworkId,
        join_timestamp: u64,
        sender: Box<dyn PacketSender>,
        receiver: Box<dyn PacketReceiver>,
        now: Instant,
    ) -> Self {
        let world = World::new(config.reserved_entity_threshold);
        let mut bootstrap = Bootstrap::new(config.bootstrap_timeout);

        // joining doubles as the request-full-state signal
        let announce = Frame::ParticipantJoined {
            network_id,
            join_timestamp,
        };
        if sender.send(&announce.encode()).is_err() {
            warn!("failed to announce join; transport already closed");
        }
        bootstrap.request_sent(now);

        Self {
            config,
            registry,
            world,
            net_map: NetEntityMap::new(),
            network_id,
            join_timestamp,
            bootstrap,
            peers: HashMap::new(),
            selections: HashMap::new(),
            sender,
            receiver,
            filter: None,
        }
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn is_synced(&self) -> bool {
        self.bootstrap.is_synced()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn peers(&self) -> impl Iterator<Item = &PeerJoinRecord> {
        self.peers.values()
    }

    pub fn selection_of(&self, network_id: &NetworkId) -> Option<NetworkEntity> {
        self.selections.get(network_id).copied()
    }

    /// Install a pre-send predicate; messages it rejects never reach the
    /// wire.
    pub fn set_filter(&mut self, filter: MessageFilter) {
        self.filter = Some(filter);
    }

    /// Give a locally authored entity a portable identity under this
    /// peer's network id and declare its replicated component kinds.
    pub fn mark_synced(&mut self, entity: Entity, kinds: Vec<ComponentKind>) {
        if !self.net_map.contains_local(&entity) {
            self.net_map
                .register_local(&mut self.world, entity, self.network_id);
        }
        self.world.mark_synced(entity, kinds);
    }

    /// Remove a locally authored entity and replicate the deletion.
    pub fn despawn(&mut self, entity: Entity) {
        self.world.despawn(entity);
        // the mapping is released after the queued delete is translated
    }

    /// Announce that this peer has the given entity selected in its
    /// editor. Selection is presence information only; it carries no
    /// replication semantics.
    pub fn select_entity(&mut self, entity: Entity) {
        let Some(net_entity) = self.net_map.network_entity(&entity) else {
            return;
        };
        let frame = Frame::ParticipantSelectedEntity {
            network_id: self.network_id,
            entity: net_entity,
        };
        let _ = self.sender.send(&frame.encode());
    }

    pub fn unselect_entity(&mut self) {
        let frame = Frame::ParticipantUnselectedEntity {
            network_id: self.network_id,
        };
        let _ = self.sender.send(&frame.encode());
    }

    /// Relay an opaque host filesystem notification to the other peers.
    pub fn send_filesystem_event(&mut self, payload: Vec<u8>) {
        let _ = self
            .sender
            .send(&Frame::FilesystemEvent(payload).encode());
    }

    /// One cooperative step: drain the inbound queue, advance the
    /// bootstrap clock, then flush locally authored changes.
    pub fn tick(&mut self, now: Instant) -> Vec<ClientEvent> {
        let mut events = Vec::new();

        // inbound is drained once per tick, never mid-tick
        loop {
            match self.receiver.receive() {
                Ok(Some(payload)) => self.handle_payload(&payload, &mut events),
                Ok(None) => break,
                Err(_) => {
                    events.push(ClientEvent::TransportClosed);
                    break;
                }
            }
        }

        if self.bootstrap.tick(now) {
            // no one answered: this peer is the first in the session
            trace!("bootstrap timed out; assuming first peer");
            events.push(ClientEvent::Synced);
        }

        self.flush_outbound();
        events
    }

    fn handle_payload(&mut self, payload: &[u8], events: &mut Vec<ClientEvent>) {
        let frame = match Frame::decode(payload) {
            Ok(frame) => frame,
            Err(error) => {
                warn!("dropping undecodable frame: {}", error);
                return;
            }
        };
        match frame {
            Frame::Init(state) => {
                if !self.bootstrap.accept_init() {
                    // first writer wins for bootstrap
                    trace!("ignoring extra full-state response");
                    return;
                }
                self.apply_network_payload(&state, events);
                events.push(ClientEvent::Synced);
            }
            Frame::CrdtPayload(payload) => self.apply_network_payload(&payload, events),
            Frame::ParticipantJoined {
                network_id,
                join_timestamp,
            } => {
                if network_id == self.network_id {
                    return;
                }
                let record = PeerJoinRecord::new(network_id, join_timestamp);
                if self.peers.insert(network_id, record).is_none() {
                    events.push(ClientEvent::PeerJoined(network_id));
                }
                self.answer_bootstrap();
            }
            Frame::ParticipantLeft { network_id } => {
                self.peers.remove(&network_id);
                self.selections.remove(&network_id);
                events.push(ClientEvent::PeerLeft(network_id));
            }
            Frame::ParticipantSelectedEntity { network_id, entity } => {
                self.selections.insert(network_id, entity);
                events.push(ClientEvent::SelectionChanged {
                    network_id,
                    entity: Some(entity),
                });
            }
            Frame::ParticipantUnselectedEntity { network_id } => {
                self.selections.remove(&network_id);
                events.push(ClientEvent::SelectionChanged {
                    network_id,
                    entity: None,
                });
            }
            Frame::FilesystemEvent(payload) => {
                events.push(ClientEvent::FilesystemEvent(payload));
            }
        }
    }

    /// Decode a batch of network-form messages, resolving each portable
    /// identity to a local entity (allocating on first sight) and applying
    /// under last-write-wins.
    fn apply_network_payload(&mut self, payload: &[u8], events: &mut Vec<ClientEvent>) {
        for message in MessageReader::new(payload) {
            let Some(net_entity) = message.network_entity() else {
                trace!(
                    "ignoring local-form {:?} message from the wire",
                    message.message_type()
                );
                continue;
            };
            if self.net_map.is_deleted(&net_entity) {
                continue;
            }

            let known = self.net_map.local_entity(&net_entity).is_ok();
            let entity = self
                .net_map
                .resolve_or_create(&mut self.world, net_entity, None);
            if !known {
                events.push(ClientEvent::EntitySpawned { entity, net_entity });
            }

            let local = message.to_local_form(entity);
            match self.world.apply_message(&self.registry, &local) {
                Ok(resolution) if resolution.accepted() => match &local {
                    CrdtMessage::PutComponent { entity, kind, .. } => {
                        events.push(ClientEvent::ComponentUpdated {
                            entity: *entity,
                            kind: *kind,
                        });
                    }
                    CrdtMessage::DeleteComponent { entity, kind, .. } => {
                        events.push(ClientEvent::ComponentRemoved {
                            entity: *entity,
                            kind: *kind,
                        });
                    }
                    CrdtMessage::DeleteEntity { entity } => {
                        self.net_map.release(entity);
                        events.push(ClientEvent::EntityDespawned { entity: *entity });
                    }
                    _ => unreachable!("local form"),
                },
                Ok(_) => {
                    // stale: an expected consequence of concurrent writers
                }
                Err(error) => {
                    warn!("dropping message with malformed payload: {}", error);
                }
            }
        }
    }

    /// A synced peer that wins the election answers newcomers with a full
    /// snapshot. With a validating server in the session the server is the
    /// oldest peer and answers instead; this path carries serverless
    /// (relay or in-process) topologies.
    fn answer_bootstrap(&mut self) {
        if !self.bootstrap.is_synced() {
            return;
        }
        let own = PeerJoinRecord::new(self.network_id, self.join_timestamp);
        let records = std::iter::once(&own).chain(self.peers.values());
        if !is_oldest(self.network_id, records) {
            return;
        }
        let snapshot = encode_full_state(&self.world, &self.net_map);
        let _ = self.sender.send(&Frame::Init(snapshot).encode());
    }

    fn flush_outbound(&mut self) {
        let outbox = self.world.take_outbox();
        if outbox.is_empty() {
            return;
        }
        let batch = collect_outbound(&self.world, &self.net_map, self.filter.as_ref(), outbox);
        for entity in &batch.released {
            self.net_map.release(entity);
        }
        for frame in encode_frames(batch.messages, self.config.max_frame_size) {
            if self.sender.send(&frame).is_err() {
                warn!("outbound send failed; transport closed");
                break;
            }
        }
    }
}
