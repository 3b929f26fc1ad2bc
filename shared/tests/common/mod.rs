//! Fixtures shared by the integration suites.

#![allow(dead_code)]

use std::any::Any;

use weft_shared::{
    ByteReader, ByteWriter, ComponentKind, SchemaError, SchemaRead, SchemaRegistry, SyncComponent,
};

pub const POSITION: ComponentKind = ComponentKind::new(10);

/// A minimal replicated component: three floats, compared exactly.
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

/// Serialized payload of a position value, for hand-built messages.
pub fn position_payload(x: f32, y: f32, z: f32) -> Box<[u8]> {
    let mut writer = ByteWriter::new();
    Position::new(x, y, z).write(&mut writer);
    writer.to_bytes().into_boxed_slice()
}
