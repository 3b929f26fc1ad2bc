use std::collections::HashMap;

use log::{info, trace, warn};

use weft_shared::{
    collect_outbound, encode_frames, encode_full_state, is_oldest, ComponentKind, CrdtMessage,
    Entity, Frame, MessageFilter, MessageReader, NetEntityMap, NetworkId, PacketReceiver,
    PacketSender, PeerJoinRecord, SchemaRegistry, SessionConfig, World,
};

use crate::{events::ServerEvent, peer::Peer, peer::PeerKey};

/// The authoritative peer. Ingests network-form messages from connected
/// peers, validates them against its own world, applies accepted changes
/// locally, and re-broadcasts them, batched and chunked, to every other
/// peer. Also owns the join bookkeeping that drives the bootstrap election.
///
/// Runs inside the host's per-frame update loop: call
/// [`receive`](Server::receive) then [`send_updates`](Server::send_updates)
/// once per tick.
pub struct Server {
    config: SessionConfig,
    registry: SchemaRegistry,
    world: World,
    net_map: NetEntityMap,
    /// The server's own loopback identity; inbound messages claiming it
    /// are rejected
    network_id: NetworkId,
    join_timestamp: u64,
    peers: HashMap<PeerKey, Peer>,
    next_peer_key: u64,
    filter: Option<MessageFilter>,
}

impl Server {
    pub fn new(config: SessionConfig, registry: SchemaRegistry) -> Self {
        let network_id = config
            .network_id
            .unwrap_or_else(|| NetworkId::new(fastrand::u64(..)));
        let world = World::new(config.reserved_entity_threshold);
        Self {
            config,
            registry,
            world,
            net_map: NetEntityMap::new(),
            network_id,
            // the server opens the session, so it is always the oldest peer
            join_timestamp: 0,
            peers: HashMap::new(),
            next_peer_key: 0,
            filter: None,
        }
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
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

    pub fn peer(&self, key: &PeerKey) -> Option<&Peer> {
        self.peers.get(key)
    }

    pub fn peer_keys(&self) -> impl Iterator<Item = PeerKey> + '_ {
        self.peers.keys().copied()
    }

    /// Install a pre-send predicate; messages it rejects never reach the
    /// wire.
    pub fn set_filter(&mut self, filter: MessageFilter) {
        self.filter = Some(filter);
    }

    /// Give a server-authored entity a portable identity so it replicates.
    pub fn mark_synced(&mut self, entity: Entity, kinds: Vec<ComponentKind>) {
        if !self.net_map.contains_local(&entity) {
            self.net_map
                .register_local(&mut self.world, entity, self.network_id);
        }
        self.world.mark_synced(entity, kinds);
    }

    /// Remove a server-authored entity and replicate the deletion.
    pub fn despawn(&mut self, entity: Entity) {
        self.world.despawn(entity);
        // the mapping is released after the queued delete is translated
    }

    /// Attach a connected transport as a new peer. The identity and join
    /// timestamp come from the host's peer-identity derivation. The
    /// newcomer immediately learns every current join record; everyone
    /// else learns the newcomer's.
    pub fn connect_peer(
        &mut self,
        network_id: NetworkId,
        join_timestamp: u64,
        sender: Box<dyn PacketSender>,
        receiver: Box<dyn PacketReceiver>,
    ) -> PeerKey {
        let key = PeerKey::new(self.next_peer_key);
        self.next_peer_key += 1;

        info!(
            "peer {:?} connected as {:?} (joined at {})",
            key, network_id, join_timestamp
        );

        // the newcomer learns who is already here, itself included
        let mut records = vec![PeerJoinRecord::new(self.network_id, self.join_timestamp)];
        records.extend(self.peers.values().map(Peer::join_record));
        for record in records {
            let frame = Frame::ParticipantJoined {
                network_id: record.network_id,
                join_timestamp: record.join_timestamp,
            };
            let _ = sender.send(&frame.encode());
        }

        let peer = Peer::new(network_id, join_timestamp, sender, receiver);
        self.peers.insert(key, peer);

        self.relay_except(
            key,
            &Frame::ParticipantJoined {
                network_id,
                join_timestamp,
            },
        );
        self.answer_bootstrap(key);
        key
    }

    /// Remove a peer and tell everyone else. Entities the peer created
    /// stay in the world; despawning them is a host policy decision.
    pub fn disconnect_peer(&mut self, key: PeerKey) -> Option<NetworkId> {
        let peer = self.peers.remove(&key)?;
        let network_id = peer.network_id();
        peer.sender.close();
        info!("peer {:?} ({:?}) disconnected", key, network_id);
        self.relay_except(key, &Frame::ParticipantLeft { network_id });
        Some(network_id)
    }

    /// Drain every peer's receive queue and run the full
    /// ingest → map → validate → apply → broadcast pipeline over each
    /// inbound batch. Called once per tick, never mid-tick.
    pub fn receive(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        let mut closed = Vec::new();

        let keys: Vec<PeerKey> = self.peers.keys().copied().collect();
        for key in keys {
            loop {
                let result = match self.peers.get_mut(&key) {
                    Some(peer) => peer.receiver.receive(),
                    None => break,
                };
                match result {
                    Ok(Some(payload)) => self.handle_payload(key, &payload, &mut events),
                    Ok(None) => break,
                    Err(_) => {
                        closed.push(key);
                        break;
                    }
                }
            }
        }

        for key in closed {
            if let Some(network_id) = self.disconnect_peer(key) {
                events.push(ServerEvent::TransportClosed { key, network_id });
            }
        }
        events
    }

    /// Flush server-authored changes to every connected peer.
    pub fn send_updates(&mut self) {
        let outbox = self.world.take_outbox();
        if outbox.is_empty() {
            return;
        }
        let batch = collect_outbound(&self.world, &self.net_map, self.filter.as_ref(), outbox);
        for entity in &batch.released {
            self.net_map.release(entity);
        }
        let frames = encode_frames(batch.messages, self.config.max_frame_size);
        for peer in self.peers.values() {
            for frame in &frames {
                let _ = peer.sender.send(frame);
            }
        }
    }

    fn handle_payload(&mut self, key: PeerKey, payload: &[u8], events: &mut Vec<ServerEvent>) {
        let frame = match Frame::decode(payload) {
            Ok(frame) => frame,
            Err(error) => {
                warn!("dropping undecodable frame from {:?}: {}", key, error);
                return;
            }
        };
        match frame {
            Frame::CrdtPayload(payload) => self.process_crdt_payload(key, &payload, events),
            Frame::ParticipantJoined {
                network_id,
                join_timestamp,
            } => {
                if let Some(peer) = self.peers.get_mut(&key) {
                    if peer.network_id() != network_id {
                        warn!(
                            "peer {:?} announced {:?} but connected as {:?}; ignoring",
                            key,
                            network_id,
                            peer.network_id()
                        );
                        return;
                    }
                    peer.set_join_timestamp(join_timestamp);
                }
                events.push(ServerEvent::PeerJoined { key, network_id });
                self.relay_except(
                    key,
                    &Frame::ParticipantJoined {
                        network_id,
                        join_timestamp,
                    },
                );
                self.answer_bootstrap(key);
            }
            Frame::ParticipantLeft { network_id } => {
                events.push(ServerEvent::PeerLeft { key, network_id });
                self.relay_except(key, &Frame::ParticipantLeft { network_id });
            }
            Frame::ParticipantSelectedEntity { network_id, entity } => {
                if let Some(peer) = self.peers.get_mut(&key) {
                    peer.selected = Some(entity);
                }
                events.push(ServerEvent::SelectionChanged {
                    network_id,
                    entity: Some(entity),
                });
                self.relay_except(key, &Frame::ParticipantSelectedEntity { network_id, entity });
            }
            Frame::ParticipantUnselectedEntity { network_id } => {
                if let Some(peer) = self.peers.get_mut(&key) {
                    peer.selected = None;
                }
                events.push(ServerEvent::SelectionChanged {
                    network_id,
                    entity: None,
                });
                self.relay_except(key, &Frame::ParticipantUnselectedEntity { network_id });
            }
            Frame::FilesystemEvent(payload) => {
                if let Some(peer) = self.peers.get(&key) {
                    events.push(ServerEvent::FilesystemEvent {
                        from: peer.network_id(),
                        payload: payload.clone(),
                    });
                }
                self.relay_except(key, &Frame::FilesystemEvent(payload));
            }
            Frame::Init(_) => {
                // the server was never a newcomer; nothing to bootstrap
                trace!("ignoring init frame from {:?}", key);
            }
        }
    }

    /// Ingest → Map-to-Local → Validate → Apply-Locally → Batch →
    /// Broadcast, for one inbound batch of CRDT messages.
    fn process_crdt_payload(
        &mut self,
        key: PeerKey,
        payload: &[u8],
        events: &mut Vec<ServerEvent>,
    ) {
        let Some(sender_id) = self.peers.get(&key).map(Peer::network_id) else {
            return;
        };
        if sender_id == self.network_id {
            warn!(
                "rejecting batch from {:?}: sender claims the server's own identity",
                key
            );
            return;
        }

        let mut accepted: Vec<CrdtMessage> = Vec::new();
        for message in MessageReader::new(payload) {
            // a server only trusts network-qualified messages from clients
            if !message.is_network_form() {
                warn!(
                    "ignoring non-networked {:?} message from {:?}",
                    message.message_type(),
                    key
                );
                continue;
            }
            let net_entity = message.network_entity().expect("network form");
            if self.net_map.is_deleted(&net_entity) {
                // deletion wins over anything still in flight
                trace!("ignoring message for deleted entity {:?}", net_entity);
                continue;
            }

            let entity =
                self.net_map
                    .resolve_or_create(&mut self.world, net_entity, Some(sender_id));
            let local = message.clone().to_local_form(entity);

            if !self.validate(entity, &local, sender_id) {
                continue;
            }

            // accepted messages mutate the authoritative world immediately,
            // in receipt order
            match self.world.apply_message(&self.registry, &local) {
                Ok(resolution) if resolution.accepted() => {
                    match &local {
                        CrdtMessage::PutComponent { entity, kind, .. } => {
                            events.push(ServerEvent::ComponentUpdated {
                                entity: *entity,
                                kind: *kind,
                                author: sender_id,
                            });
                        }
                        CrdtMessage::DeleteComponent { entity, kind, .. } => {
                            events.push(ServerEvent::ComponentRemoved {
                                entity: *entity,
                                kind: *kind,
                                author: sender_id,
                            });
                        }
                        CrdtMessage::DeleteEntity { entity } => {
                            self.net_map.release(entity);
                            events.push(ServerEvent::EntityDespawned {
                                entity: *entity,
                                author: sender_id,
                            });
                        }
                        _ => unreachable!("local form"),
                    }
                    // re-broadcast keeps the original sender's identity
                    accepted.push(message);
                }
                Ok(_) => {
                    // stale: an expected consequence of concurrent writers
                }
                Err(error) => {
                    warn!("dropping message with malformed payload: {}", error);
                }
            }
        }

        if accepted.is_empty() {
            return;
        }
        let frames = encode_frames(accepted, self.config.max_frame_size);
        for (peer_key, peer) in &self.peers {
            // the sender never receives its own broadcast
            if *peer_key == key {
                continue;
            }
            for frame in &frames {
                if peer.sender.send(frame).is_err() {
                    warn!("failed to forward batch to {:?}", peer_key);
                    break;
                }
            }
        }
    }

    /// The validation stage: schema acceptance, advisory permissions, and
    /// a dry-run conflict check. A message failing any check is dropped
    /// and excluded from both local application and broadcast.
    fn validate(&self, entity: Entity, local: &CrdtMessage, sender_id: NetworkId) -> bool {
        match local {
            CrdtMessage::PutComponent { kind, payload, .. } => {
                if let Err(error) = self.registry.validate_payload(kind, payload) {
                    warn!(
                        "rejecting put from {:?}: payload fails schema ({})",
                        sender_id, error
                    );
                    return false;
                }
            }
            CrdtMessage::DeleteComponent { kind, .. } => {
                if !self.registry.contains(kind) {
                    warn!(
                        "rejecting delete from {:?}: unknown component kind {:?}",
                        sender_id, kind
                    );
                    return false;
                }
            }
            CrdtMessage::DeleteEntity { .. } => {
                // only the creating peer (or the server) may delete an entity
                if let Some(creator) = self.net_map.created_by(&self.world, entity) {
                    if creator != sender_id {
                        warn!(
                            "rejecting unauthorized entity delete from {:?} (created by {:?})",
                            sender_id, creator
                        );
                        return false;
                    }
                }
            }
            _ => unreachable!("local form"),
        }

        // dry-run conflict check; stale messages are dropped silently
        self.world.resolve(local).accepted()
    }

    fn answer_bootstrap(&self, key: PeerKey) {
        // any synced peer could respond; the server competes in the same
        // election as everyone else and wins only when it is oldest
        let mut records = vec![PeerJoinRecord::new(self.network_id, self.join_timestamp)];
        records.extend(
            self.peers
                .iter()
                .filter(|(peer_key, _)| **peer_key != key)
                .map(|(_, peer)| peer.join_record()),
        );
        if !is_oldest(self.network_id, records.iter()) {
            return;
        }
        let Some(peer) = self.peers.get(&key) else {
            return;
        };
        let snapshot = encode_full_state(&self.world, &self.net_map);
        let _ = peer.sender.send(&Frame::Init(snapshot).encode());
    }

    fn relay_except(&self, except: PeerKey, frame: &Frame) {
        let bytes = frame.encode();
        for (peer_key, peer) in &self.peers {
            if *peer_key == except {
                continue;
            }
            let _ = peer.sender.send(&bytes);
        }
    }
}
