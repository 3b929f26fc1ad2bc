use log::warn;

use crate::{
    bytes::{ByteReader, ReadError},
    component::ComponentKind,
    world::{Entity, NetworkEntity, NetworkId},
};

use super::{
    crdt_message::{CrdtMessage, HEADER_BYTES},
    message_type::MessageType,
};

fn read_network_entity(body: &mut ByteReader) -> Result<NetworkEntity, ReadError> {
    let network_id = NetworkId::new(body.read_u64()?);
    let entity_id = body.read_u32()?;
    Ok(NetworkEntity::new(network_id, entity_id))
}

fn read_payload(body: &mut ByteReader) -> Result<Box<[u8]>, ReadError> {
    let length = body.read_u32()? as usize;
    Ok(body.read_bytes(length)?.into())
}

fn read_body(message_type: MessageType, body: &mut ByteReader) -> Result<CrdtMessage, ReadError> {
    match message_type {
        MessageType::PutComponent => Ok(CrdtMessage::PutComponent {
            entity: Entity::new(body.read_u32()?),
            kind: ComponentKind::new(body.read_u32()?),
            timestamp: body.read_u64()?,
            payload: read_payload(body)?,
        }),
        MessageType::DeleteComponent => Ok(CrdtMessage::DeleteComponent {
            entity: Entity::new(body.read_u32()?),
            kind: ComponentKind::new(body.read_u32()?),
            timestamp: body.read_u64()?,
        }),
        MessageType::DeleteEntity => Ok(CrdtMessage::DeleteEntity {
            entity: Entity::new(body.read_u32()?),
        }),
        MessageType::PutComponentNetwork => Ok(CrdtMessage::PutComponentNetwork {
            entity: read_network_entity(body)?,
            kind: ComponentKind::new(body.read_u32()?),
            timestamp: body.read_u64()?,
            payload: read_payload(body)?,
        }),
        MessageType::DeleteComponentNetwork => Ok(CrdtMessage::DeleteComponentNetwork {
            entity: read_network_entity(body)?,
            kind: ComponentKind::new(body.read_u32()?),
            timestamp: body.read_u64()?,
        }),
        MessageType::DeleteEntityNetwork => Ok(CrdtMessage::DeleteEntityNetwork {
            entity: read_network_entity(body)?,
        }),
    }
}

/// Iterates the raw byte span of each well-delimited message in a buffer,
/// without decoding bodies. The chunker uses this to find message
/// boundaries; unknown type tags are still yielded so they can be forwarded.
pub struct RawMessageIter<'b> {
    buffer: &'b [u8],
    cursor: usize,
    poisoned: bool,
}

impl<'b> RawMessageIter<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            poisoned: false,
        }
    }

    /// Bytes at the tail that did not form a complete message. Meaningful
    /// once the iterator has returned `None`.
    pub fn leftover(&self) -> usize {
        self.buffer.len() - self.cursor
    }
}

impl<'b> Iterator for RawMessageIter<'b> {
    type Item = &'b [u8];

    fn next(&mut self) -> Option<&'b [u8]> {
        let remaining = self.buffer.len() - self.cursor;
        if self.poisoned || remaining < HEADER_BYTES {
            return None;
        }
        let mut header = ByteReader::new(&self.buffer[self.cursor..]);
        let length = header.read_u32().expect("header length checked") as usize;
        if length < HEADER_BYTES || length > remaining {
            // either an unrecoverable header or a truncated tail; stop and
            // leave the remainder as leftover
            self.poisoned = true;
            return None;
        }
        let span = &self.buffer[self.cursor..self.cursor + length];
        self.cursor += length;
        Some(span)
    }
}

/// Lazily decodes a stream of concatenated messages. Finite and not
/// restartable: each call consumes the read cursor.
///
/// Decoding never fails across this boundary. Incomplete trailing data ends
/// iteration (the caller buffers and retries once more bytes arrive);
/// unknown type tags are skipped by consuming exactly the declared length;
/// a body that fails to parse inside a well-delimited message is dropped
/// and iteration resumes at the next boundary.
pub struct MessageReader<'b> {
    buffer: &'b [u8],
    cursor: usize,
}

impl<'b> MessageReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }
}

impl<'b> Iterator for MessageReader<'b> {
    type Item = CrdtMessage;

    fn next(&mut self) -> Option<CrdtMessage> {
        loop {
            let remaining = self.buffer.len() - self.cursor;
            if remaining < HEADER_BYTES {
                return None;
            }
            let mut header = ByteReader::new(&self.buffer[self.cursor..]);
            let length = header.read_u32().expect("header length checked") as usize;
            let tag = header.read_u32().expect("header length checked");

            if length < HEADER_BYTES {
                // cannot locate the next boundary; discard the remainder
                warn!(
                    "discarding {} bytes after malformed message header (declared length {})",
                    remaining, length
                );
                self.cursor = self.buffer.len();
                return None;
            }
            if length > remaining {
                // incomplete trailing data; the caller buffers and retries
                return None;
            }

            let body = &self.buffer[self.cursor + HEADER_BYTES..self.cursor + length];
            self.cursor += length;

            let Some(message_type) = MessageType::from_tag(tag) else {
                // unknown type: forward compatibility, skip exactly
                continue;
            };

            match read_body(message_type, &mut ByteReader::new(body)) {
                Ok(message) => return Some(message),
                Err(error) => {
                    warn!(
                        "dropping malformed {:?} message ({}); resuming at next boundary",
                        message_type, error
                    );
                    continue;
                }
            }
        }
    }
}
