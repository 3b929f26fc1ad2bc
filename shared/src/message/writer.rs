use crate::{
    bytes::ByteWriter,
    world::{Entity, NetworkEntity},
};

use super::crdt_message::CrdtMessage;

fn write_local_entity(writer: &mut ByteWriter, entity: &Entity) {
    writer.write_u32(entity.id());
}

fn write_network_entity(writer: &mut ByteWriter, entity: &NetworkEntity) {
    writer.write_u64(entity.network_id.value());
    writer.write_u32(entity.entity_id);
}

/// Append one self-delimiting message: fixed header, then the type-specific
/// body. The declared length always covers the whole message including the
/// header, which is what lets decoders skip unknown types exactly.
pub fn write_message(message: &CrdtMessage, writer: &mut ByteWriter) {
    writer.write_u32(message.encoded_len() as u32);
    writer.write_u32(message.message_type().tag());

    match message {
        CrdtMessage::PutComponent {
            entity,
            kind,
            timestamp,
            payload,
        } => {
            write_local_entity(writer, entity);
            writer.write_u32(kind.value());
            writer.write_u64(*timestamp);
            writer.write_u32(payload.len() as u32);
            writer.write_bytes(payload);
        }
        CrdtMessage::DeleteComponent {
            entity,
            kind,
            timestamp,
        } => {
            write_local_entity(writer, entity);
            writer.write_u32(kind.value());
            writer.write_u64(*timestamp);
        }
        CrdtMessage::DeleteEntity { entity } => {
            write_local_entity(writer, entity);
        }
        CrdtMessage::PutComponentNetwork {
            entity,
            kind,
            timestamp,
            payload,
        } => {
            write_network_entity(writer, entity);
            writer.write_u32(kind.value());
            writer.write_u64(*timestamp);
            writer.write_u32(payload.len() as u32);
            writer.write_bytes(payload);
        }
        CrdtMessage::DeleteComponentNetwork {
            entity,
            kind,
            timestamp,
        } => {
            write_network_entity(writer, entity);
            writer.write_u32(kind.value());
            writer.write_u64(*timestamp);
        }
        CrdtMessage::DeleteEntityNetwork { entity } => {
            write_network_entity(writer, entity);
        }
    }
}

/// Encode a batch of messages into one contiguous buffer.
pub fn write_messages(messages: &[CrdtMessage]) -> Vec<u8> {
    let capacity = messages.iter().map(CrdtMessage::encoded_len).sum();
    let mut writer = ByteWriter::with_capacity(capacity);
    for message in messages {
        write_message(message, &mut writer);
    }
    writer.to_bytes()
}
