//! Fixtures shared by the server integration suites.

#![allow(dead_code)]

use std::any::Any;

use weft_server::Server;
use weft_shared::{
    ByteReader, ByteWriter, ChannelTransport, ComponentKind, Frame, NetworkId, PacketChannel,
    PacketReceiver, PacketSender, SchemaError, SchemaRead, SchemaRegistry, SessionConfig,
    SyncComponent,
};

pub const POSITION: ComponentKind = ComponentKind::new(10);

#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl SyncComponent for Position {
    fn write(&self, writer: &mut ByteWriter) {
        writer.write_f32(self.x);
        writer.write_f32(self.y);
        writer.write_f32(self.z);
    }

    fn boxed_clone(&self) -> Box<dyn SyncComponent> {
        Box::new(self.clone())
    }

    fn equals(&self, other: &dyn SyncComponent) -> bool {
        other.downcast_ref::<Self>() == Some(self)
    }

    fn to_boxed_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SchemaRead for Position {
    fn name() -> &'static str {
        "Position"
    }

    fn read(reader: &mut ByteReader) -> Result<Self, SchemaError> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
        })
    }
}

pub fn test_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register::<Position>(POSITION);
    registry
}

pub fn position_payload(x: f32, y: f32, z: f32) -> Box<[u8]> {
    let mut writer = ByteWriter::new();
    Position::new(x, y, z).write(&mut writer);
    writer.to_bytes().into_boxed_slice()
}

pub fn test_server() -> Server {
    let mut config = SessionConfig::server();
    config.network_id = Some(NetworkId::new(1000));
    Server::new(config, test_registry())
}

/// The far end of a raw channel peer: everything a test drives by hand.
pub struct RawPeer {
    pub sender: Box<dyn PacketSender>,
    pub receiver: Box<dyn PacketReceiver>,
}

impl RawPeer {
    /// Collect every frame currently queued for this peer.
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(Some(payload)) = self.receiver.receive() {
            frames.push(Frame::decode(&payload).unwrap());
        }
        frames
    }

    pub fn send(&self, frame: &Frame) {
        self.sender.send(&frame.encode()).unwrap();
    }
}

/// Attach a hand-driven peer to the server, returning the far endpoints.
pub fn connect_raw_peer(server: &mut Server, network_id: u64, join_timestamp: u64) -> RawPeer {
    let (server_end, peer_end) = PacketChannel::pair();
    let (sender, receiver) = ChannelTransport::split(server_end);
    server.connect_peer(NetworkId::new(network_id), join_timestamp, sender, receiver);
    let (sender, receiver) = ChannelTransport::split(peer_end);
    RawPeer { sender, receiver }
}
