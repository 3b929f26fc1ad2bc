//! # Weft Client
//! A client peer that replicates a shared entity/component world with a
//! weft server (or directly with other peers over a relay), bootstrapping
//! full state from the oldest connected peer on join.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub mod shared {
    pub use weft_shared::{
        ByteReader, ByteWriter, ChannelTransport, ComponentKind, CrdtMessage, Entity, Frame,
        NetworkEntity, NetworkId, PacketChannel, PacketReceiver, PacketSender, SchemaRead,
        SchemaRegistry, SessionConfig, SyncComponent, SyncSet, World,
    };
}

mod client;
mod events;
pub mod transport;

pub use client::Client;
pub use events::ClientEvent;
