use std::any::Any;

use crate::bytes::{ByteReader, ByteWriter};

use super::{
    error::SchemaError,
    kind::ComponentKind,
    schema::{SchemaRead, SyncComponent},
};

/// Marker component declaring which of an entity's components replicate.
///
/// Attaching a `SyncSet` is what makes an entity eligible for cross-peer
/// transmission: only messages for kinds in the set (or the set itself, or
/// entity deletion) pass the outbound transport filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncSet {
    kinds: Vec<ComponentKind>,
}

impl SyncSet {
    /// Reserved kind of the marker itself
    pub const KIND: ComponentKind = ComponentKind::new(0);

    pub fn new(kinds: Vec<ComponentKind>) -> Self {
        Self { kinds }
    }

    pub fn contains(&self, kind: &ComponentKind) -> bool {
        self.kinds.contains(kind)
    }

    pub fn kinds(&self) -> &[ComponentKind] {
        &self.kinds
    }
}

impl SyncComponent for SyncSet {
    fn write(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.kinds.len() as u32);
        for kind in &self.kinds {
            writer.write_u32(kind.value());
        }
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

impl SchemaRead for SyncSet {
    fn name() -> &'static str {
        "SyncSet"
    }

    fn read(reader: &mut ByteReader) -> Result<Self, SchemaError> {
        let count = reader.read_u32()? as usize;
        // a count that cannot fit in the remaining payload is malformed,
        // not a reason to attempt a huge allocation
        if count > reader.remaining() / 4 {
            return Err(SchemaError::MalformedValue {
                name: Self::name(),
            });
        }
        let mut kinds = Vec::with_capacity(count);
        for _ in 0..count {
            kinds.push(ComponentKind::new(reader.read_u32()?));
        }
        Ok(Self { kinds })
    }
}
