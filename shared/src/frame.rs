//! First-byte-kind framing for socket transports.
//!
//! Every payload handed to a transport is one frame: a single kind byte
//! followed by a kind-specific body. CRDT payloads inside a frame are
//! pre-chunked to the transport's frame limit before they get here.

use thiserror::Error;

use crate::{
    bytes::{ByteReader, ByteWriter, ReadError},
    world::{NetworkEntity, NetworkId},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("empty frame")]
    Empty,

    #[error("unknown frame kind: {kind}")]
    UnknownKind { kind: u8 },

    #[error("frame body truncated: {0}")]
    Truncated(#[from] ReadError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Full-state snapshot sent to a joining peer; body is a stream of
    /// encoded network-form put messages
    Init(Vec<u8>),
    /// A peer entered the session. Doubles as its request for full state.
    ParticipantJoined {
        network_id: NetworkId,
        join_timestamp: u64,
    },
    ParticipantLeft {
        network_id: NetworkId,
    },
    ParticipantSelectedEntity {
        network_id: NetworkId,
        entity: NetworkEntity,
    },
    ParticipantUnselectedEntity {
        network_id: NetworkId,
    },
    /// One or more concatenated CRDT messages, at most one chunk's worth
    CrdtPayload(Vec<u8>),
    /// Opaque host filesystem notification, relayed verbatim
    FilesystemEvent(Vec<u8>),
}

const KIND_INIT: u8 = 0;
const KIND_PARTICIPANT_JOINED: u8 = 1;
const KIND_PARTICIPANT_LEFT: u8 = 2;
const KIND_PARTICIPANT_SELECTED: u8 = 3;
const KIND_PARTICIPANT_UNSELECTED: u8 = 4;
const KIND_CRDT_PAYLOAD: u8 = 5;
const KIND_FILESYSTEM_EVENT: u8 = 6;

impl Frame {
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        match self {
            Frame::Init(payload) => {
                writer.write_u8(KIND_INIT);
                writer.write_bytes(payload);
            }
            Frame::ParticipantJoined {
                network_id,
                join_timestamp,
            } => {
                writer.write_u8(KIND_PARTICIPANT_JOINED);
                writer.write_u64(network_id.value());
                writer.write_u64(*join_timestamp);
            }
            Frame::ParticipantLeft { network_id } => {
                writer.write_u8(KIND_PARTICIPANT_LEFT);
                writer.write_u64(network_id.value());
            }
            Frame::ParticipantSelectedEntity { network_id, entity } => {
                writer.write_u8(KIND_PARTICIPANT_SELECTED);
                writer.write_u64(network_id.value());
                writer.write_u64(entity.network_id.value());
                writer.write_u32(entity.entity_id);
            }
            Frame::ParticipantUnselectedEntity { network_id } => {
                writer.write_u8(KIND_PARTICIPANT_UNSELECTED);
                writer.write_u64(network_id.value());
            }
            Frame::CrdtPayload(payload) => {
                writer.write_u8(KIND_CRDT_PAYLOAD);
                writer.write_bytes(payload);
            }
            Frame::FilesystemEvent(payload) => {
                writer.write_u8(KIND_FILESYSTEM_EVENT);
                writer.write_bytes(payload);
            }
        }
        writer.to_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Frame, FrameError> {
        let mut reader = ByteReader::new(bytes);
        let kind = reader.read_u8().map_err(|_| FrameError::Empty)?;
        match kind {
            KIND_INIT => Ok(Frame::Init(reader.read_bytes(reader.remaining())?.to_vec())),
            KIND_PARTICIPANT_JOINED => Ok(Frame::ParticipantJoined {
                network_id: NetworkId::new(reader.read_u64()?),
                join_timestamp: reader.read_u64()?,
            }),
            KIND_PARTICIPANT_LEFT => Ok(Frame::ParticipantLeft {
                network_id: NetworkId::new(reader.read_u64()?),
            }),
            KIND_PARTICIPANT_SELECTED => Ok(Frame::ParticipantSelectedEntity {
                network_id: NetworkId::new(reader.read_u64()?),
                entity: NetworkEntity::new(
                    NetworkId::new(reader.read_u64()?),
                    reader.read_u32()?,
                ),
            }),
            KIND_PARTICIPANT_UNSELECTED => Ok(Frame::ParticipantUnselectedEntity {
                network_id: NetworkId::new(reader.read_u64()?),
            }),
            KIND_CRDT_PAYLOAD => Ok(Frame::CrdtPayload(
                reader.read_bytes(reader.remaining())?.to_vec(),
            )),
            KIND_FILESYSTEM_EVENT => Ok(Frame::FilesystemEvent(
                reader.read_bytes(reader.remaining())?.to_vec(),
            )),
            kind => Err(FrameError::UnknownKind { kind }),
        }
    }
}
