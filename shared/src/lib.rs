//! # Weft Shared
//! Common functionality shared between weft-server & weft-client crates:
//! the wire codec, the component table, network-entity virtualization,
//! last-write-wins resolution, chunking, and the transport contract.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bytes;
mod chunk;
mod component;
mod config;
mod frame;
mod lww;
mod message;
mod outbound;
mod peer;
mod transport;
mod types;
mod world;

pub use bytes::{ByteReader, ByteWriter, ReadError};
pub use chunk::{chunk_messages, ChunkError};
pub use component::{
    ComponentKind, NetworkIdentity, SchemaError, SchemaRead, SchemaRegistry, SyncComponent,
    SyncSet,
};
pub use config::{
    SessionConfig, DEFAULT_BOOTSTRAP_TIMEOUT, DEFAULT_MAX_FRAME_SIZE,
    DEFAULT_RESERVED_ENTITY_THRESHOLD,
};
pub use frame::{Frame, FrameError};
pub use lww::{resolve, Resolution, FIRST_WRITE_TIMESTAMP};
pub use message::{
    write_message, write_messages, CrdtMessage, MessageReader, MessageType, RawMessageIter,
    HEADER_BYTES,
};
pub use outbound::{collect_outbound, encode_frames, OutboundBatch};
pub use peer::{is_oldest, oldest, Bootstrap, BootstrapPhase, PeerJoinRecord};
pub use transport::{
    replication_eligible, ChannelTransport, MessageFilter, PacketChannel, PacketReceiver,
    PacketReceiverClone, PacketSender, RecvError, SendError,
};
pub use types::{HostRole, Timestamp};
pub use world::{
    encode_full_state, full_state_messages, ComponentSlot, Entity, EntityDoesNotExistError,
    NetEntityMap, NetworkEntity, NetworkId, World,
};
