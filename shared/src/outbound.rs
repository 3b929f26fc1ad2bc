//! Translation of locally authored messages into network form, shared by
//! both roles' outbound flush paths.

use log::warn;

use crate::{
    chunk::chunk_messages,
    frame::Frame,
    message::{write_messages, CrdtMessage},
    transport::{replication_eligible, MessageFilter},
    world::{Entity, NetEntityMap, World},
};

/// Result of filtering and translating one outbox drain. `released` lists
/// entities whose delete-entity message was translated this batch; their
/// mappings must be released once the batch is encoded.
pub struct OutboundBatch {
    pub messages: Vec<CrdtMessage>,
    pub released: Vec<Entity>,
}

/// Filter an outbox down to replication-eligible messages and substitute
/// portable identities. Messages for entities with no mapping are
/// local-only and silently retained on this peer.
pub fn collect_outbound(
    world: &World,
    net_map: &NetEntityMap,
    filter: Option<&MessageFilter>,
    outbox: Vec<CrdtMessage>,
) -> OutboundBatch {
    let mut messages = Vec::new();
    let mut released = Vec::new();
    for message in outbox {
        if !replication_eligible(world, &message) {
            continue;
        }
        if let Some(filter) = filter {
            if !filter(&message) {
                continue;
            }
        }
        let Some(entity) = message.local_entity() else {
            continue;
        };
        let Some(net_entity) = net_map.network_entity(&entity) else {
            continue;
        };
        if matches!(message, CrdtMessage::DeleteEntity { .. }) {
            released.push(entity);
        }
        messages.push(message.to_network_form(net_entity));
    }
    OutboundBatch { messages, released }
}

/// Combine a batch of network-form messages into as few transport frames
/// as possible: drop anything that can never fit one frame, encode the
/// rest into one buffer, and chunk it on message boundaries. Returns
/// ready-to-send frame bytes.
pub fn encode_frames(messages: Vec<CrdtMessage>, max_frame_size: usize) -> Vec<Vec<u8>> {
    // one byte of every wire frame is the frame-kind tag
    let budget = max_frame_size.saturating_sub(1);

    let mut sendable = Vec::with_capacity(messages.len());
    for message in messages {
        let size = message.encoded_len();
        if size > budget {
            // a configuration or application error, never sent fragmented
            warn!(
                "dropping oversized {:?} message: {} bytes exceeds frame limit of {}",
                message.message_type(),
                size,
                budget
            );
            continue;
        }
        sendable.push(message);
    }
    if sendable.is_empty() {
        return Vec::new();
    }

    let buffer = write_messages(&sendable);
    match chunk_messages(&buffer, budget) {
        Ok(frames) => frames
            .into_iter()
            .map(|frame| Frame::CrdtPayload(frame).encode())
            .collect(),
        Err(error) => {
            warn!("failed to chunk outbound batch: {}", error);
            Vec::new()
        }
    }
}
