/// End-to-end replication through the validate-and-broadcast pipeline:
/// two real clients and a server over in-process transports, the
/// last-write-wins overwrite scenario, broadcast exclusion of the sender,
/// and the full-state snapshot handed to late joiners.
mod common;

use std::time::Instant;

use common::{connect_raw_peer, position_payload, test_registry, test_server, Position, POSITION};

use weft_client::{Client, ClientEvent};
use weft_server::Server;
use weft_shared::{
    write_messages, ChannelTransport, CrdtMessage, Entity, Frame, MessageReader, NetworkEntity,
    NetworkId, PacketChannel, SessionConfig, SyncSet,
};

fn connect_client(server: &mut Server, network_id: u64, join_timestamp: u64, now: Instant) -> Client {
    let (server_end, client_end) = PacketChannel::pair();
    let (sender, receiver) = ChannelTransport::split(server_end);
    server.connect_peer(NetworkId::new(network_id), join_timestamp, sender, receiver);
    let (sender, receiver) = ChannelTransport::split(client_end);
    Client::connect(
        SessionConfig::client(),
        test_registry(),
        NetworkId::new(network_id),
        join_timestamp,
        sender,
        receiver,
        now,
    )
}

// ========== The position overwrite scenario ==========

#[test]
fn test_put_overwrite_and_stale_resend_across_three_peers() {
    let now = Instant::now();
    let mut server = test_server();
    let mut peer_a = connect_client(&mut server, 1, 100, now);
    let mut peer_b = connect_client(&mut server, 2, 200, now);

    server.receive();
    assert!(peer_a.tick(now).iter().any(|e| matches!(e, ClientEvent::Synced)));
    assert!(peer_b.tick(now).iter().any(|e| matches!(e, ClientEvent::Synced)));

    // peer A authors an entity with a synchronized position
    let authored = peer_a.world_mut().spawn();
    peer_a
        .world_mut()
        .insert_component(authored, POSITION, Box::new(Position::new(1.0, 2.0, 3.0)));
    peer_a.mark_synced(authored, vec![POSITION]);
    peer_a.tick(now);

    // the server validates, applies to its own world, and re-broadcasts
    server.receive();
    let server_entity = server
        .world()
        .entities()
        .find(|entity| server.world().component::<Position>(*entity, &POSITION).is_some())
        .expect("server applied the put");
    assert_eq!(
        server.world().component::<Position>(server_entity, &POSITION),
        Some(&Position::new(1.0, 2.0, 3.0))
    );

    // peer B allocates its own handle for A's entity and applies the value
    let events = peer_b.tick(now);
    let replicated = events
        .iter()
        .find_map(|event| match event {
            ClientEvent::EntitySpawned { entity, net_entity } => {
                assert_eq!(
                    *net_entity,
                    NetworkEntity::new(NetworkId::new(1), authored.id())
                );
                Some(*entity)
            }
            _ => None,
        })
        .expect("entity replicated to peer B");
    assert_eq!(
        peer_b.world().component::<Position>(replicated, &POSITION),
        Some(&Position::new(1.0, 2.0, 3.0))
    );

    // a newer write from A overwrites everywhere
    peer_a
        .world_mut()
        .insert_component(authored, POSITION, Box::new(Position::new(9.0, 9.0, 9.0)));
    peer_a.tick(now);
    server.receive();
    peer_b.tick(now);
    assert_eq!(
        peer_b.world().component::<Position>(replicated, &POSITION),
        Some(&Position::new(9.0, 9.0, 9.0))
    );

    // a stale resend of the first write changes nothing, anywhere
    let stale_sender = connect_raw_peer(&mut server, 3, 300);
    let stale = CrdtMessage::PutComponentNetwork {
        entity: NetworkEntity::new(NetworkId::new(1), authored.id()),
        kind: POSITION,
        timestamp: 1,
        payload: position_payload(1.0, 2.0, 3.0),
    };
    stale_sender.send(&Frame::CrdtPayload(write_messages(&[stale])));
    server.receive();
    peer_b.tick(now);

    assert_eq!(
        server.world().component::<Position>(server_entity, &POSITION),
        Some(&Position::new(9.0, 9.0, 9.0))
    );
    assert_eq!(
        peer_b.world().component::<Position>(replicated, &POSITION),
        Some(&Position::new(9.0, 9.0, 9.0))
    );
}

// ========== Broadcast exclusion ==========

#[test]
fn test_broadcast_reaches_everyone_but_the_sender() {
    let mut server = test_server();
    let mut sender = connect_raw_peer(&mut server, 7, 100);
    let mut peer_1 = connect_raw_peer(&mut server, 8, 200);
    let mut peer_2 = connect_raw_peer(&mut server, 9, 300);
    sender.drain();
    peer_1.drain();
    peer_2.drain();

    let message = CrdtMessage::PutComponentNetwork {
        entity: NetworkEntity::new(NetworkId::new(7), 42),
        kind: POSITION,
        timestamp: 1,
        payload: position_payload(5.0, 5.0, 5.0),
    };
    sender.send(&Frame::CrdtPayload(write_messages(std::slice::from_ref(
        &message,
    ))));
    server.receive();

    let got_payload = |frames: Vec<Frame>| {
        frames
            .iter()
            .any(|frame| matches!(frame, Frame::CrdtPayload(_)))
    };
    assert!(got_payload(peer_1.drain()));
    assert!(got_payload(peer_2.drain()));
    // no echo to the sender
    assert!(!got_payload(sender.drain()));
}

// ========== Server-authored changes ==========

#[test]
fn test_server_authored_state_reaches_all_peers() {
    let mut server = test_server();
    let mut peer_1 = connect_raw_peer(&mut server, 8, 200);
    let mut peer_2 = connect_raw_peer(&mut server, 9, 300);
    peer_1.drain();
    peer_2.drain();

    let entity = server.world_mut().spawn();
    server
        .world_mut()
        .insert_component(entity, POSITION, Box::new(Position::new(4.0, 4.0, 4.0)));
    server.mark_synced(entity, vec![POSITION]);
    server.send_updates();

    for peer in [&mut peer_1, &mut peer_2] {
        let messages: Vec<CrdtMessage> = peer
            .drain()
            .into_iter()
            .filter_map(|frame| match frame {
                Frame::CrdtPayload(payload) => Some(payload),
                _ => None,
            })
            .flat_map(|payload| MessageReader::new(&payload).collect::<Vec<_>>())
            .collect();
        assert!(messages.iter().any(|message| {
            message.component_kind() == Some(POSITION)
                && message.network_entity().map(|net| net.network_id)
                    == Some(server.network_id())
        }));
    }
}

// ========== Late joiners ==========

#[test]
fn test_late_joiner_receives_full_state_snapshot() {
    let now = Instant::now();
    let mut server = test_server();
    let mut peer_a = connect_client(&mut server, 1, 100, now);
    server.receive();
    peer_a.tick(now);

    let authored = peer_a.world_mut().spawn();
    peer_a
        .world_mut()
        .insert_component(authored, POSITION, Box::new(Position::new(1.0, 2.0, 3.0)));
    peer_a.mark_synced(authored, vec![POSITION]);
    peer_a
        .world_mut()
        .insert_component(authored, POSITION, Box::new(Position::new(6.0, 7.0, 8.0)));
    peer_a.tick(now);
    server.receive();

    // the server is the oldest peer, so it answers the newcomer itself
    let mut late = connect_raw_peer(&mut server, 5, 500);
    let snapshot = late
        .drain()
        .into_iter()
        .find_map(|frame| match frame {
            Frame::Init(payload) => Some(payload),
            _ => None,
        })
        .expect("late joiner got a full-state response");

    let messages: Vec<CrdtMessage> = MessageReader::new(&snapshot).collect();
    let expected_entity = NetworkEntity::new(NetworkId::new(1), authored.id());

    let marker = messages
        .iter()
        .find(|message| message.component_kind() == Some(SyncSet::KIND))
        .expect("snapshot declares the sync set");
    assert_eq!(marker.network_entity(), Some(expected_entity));

    let position = messages
        .iter()
        .find(|message| message.component_kind() == Some(POSITION))
        .expect("snapshot carries the current value");
    assert_eq!(position.network_entity(), Some(expected_entity));
    // stamped with the live timestamp, not reset
    assert_eq!(position.timestamp(), Some(2));
    let CrdtMessage::PutComponentNetwork { payload, .. } = position else {
        panic!("snapshot values are network-form puts");
    };
    assert_eq!(payload.as_ref(), position_payload(6.0, 7.0, 8.0).as_ref());
}

// ========== Disconnect ==========

#[test]
fn test_closed_transport_disconnects_peer_and_notifies_others() {
    let mut server = test_server();
    let leaver = connect_raw_peer(&mut server, 7, 100);
    let mut observer = connect_raw_peer(&mut server, 8, 200);
    observer.drain();

    leaver.sender.close();
    drop(leaver);
    let events = server.receive();

    assert!(events.iter().any(|event| matches!(
        event,
        weft_server::ServerEvent::TransportClosed { network_id, .. }
            if *network_id == NetworkId::new(7)
    )));
    assert!(observer.drain().iter().any(|frame| matches!(
        frame,
        Frame::ParticipantLeft { network_id } if *network_id == NetworkId::new(7)
    )));
}

// ========== Virtualization across the pipeline ==========

#[test]
fn test_same_network_entity_maps_once_on_the_server() {
    let mut server = test_server();
    let sender = connect_raw_peer(&mut server, 7, 100);

    let net_entity = NetworkEntity::new(NetworkId::new(7), 42);
    let first = CrdtMessage::PutComponentNetwork {
        entity: net_entity,
        kind: POSITION,
        timestamp: 1,
        payload: position_payload(1.0, 1.0, 1.0),
    };
    let second = CrdtMessage::PutComponentNetwork {
        entity: net_entity,
        kind: POSITION,
        timestamp: 2,
        payload: position_payload(2.0, 2.0, 2.0),
    };
    sender.send(&Frame::CrdtPayload(write_messages(&[first])));
    server.receive();
    sender.send(&Frame::CrdtPayload(write_messages(&[second])));
    server.receive();

    let with_position: Vec<Entity> = server
        .world()
        .entities()
        .filter(|entity| server.world().component::<Position>(*entity, &POSITION).is_some())
        .collect();
    assert_eq!(with_position.len(), 1);
    assert_eq!(
        server.world().component::<Position>(with_position[0], &POSITION),
        Some(&Position::new(2.0, 2.0, 2.0))
    );
}
