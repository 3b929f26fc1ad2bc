//! # Weft Server
//! An authoritative server that validates entity/component updates from
//! connected peers, applies accepted changes to its own world, and
//! re-broadcasts them in batched, size-bounded frames.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use weft_shared::{
        ByteReader, ByteWriter, ChannelTransport, ComponentKind, CrdtMessage, Entity, Frame,
        NetworkEntity, NetworkId, PacketChannel, PacketReceiver, PacketSender, SchemaRead,
        SchemaRegistry, SessionConfig, SyncComponent, SyncSet, World,
    };
}

mod events;
mod peer;
mod server;

pub use events::ServerEvent;
pub use peer::{Peer, PeerKey};
pub use server::Server;
