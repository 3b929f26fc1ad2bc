use std::any::Any;

use crate::{
    bytes::{ByteReader, ByteWriter},
    world::{NetworkEntity, NetworkId},
};

use super::{
    error::SchemaError,
    kind::ComponentKind,
    schema::{SchemaRead, SyncComponent},
};

/// The portable identity of an entity, stored as a component on the entity
/// itself so the mapping survives inspection and entity-id reuse. A
/// secondary index over these lives in
/// [`NetEntityMap`](crate::world::NetEntityMap).
///
/// `created_by` is recorded on the server only and backs the advisory
/// permission checks in the validation pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkIdentity {
    network_entity: NetworkEntity,
    created_by: Option<NetworkId>,
}

impl NetworkIdentity {
    /// Reserved kind of the mapping component
    pub const KIND: ComponentKind = ComponentKind::new(1);

    pub fn new(network_entity: NetworkEntity, created_by: Option<NetworkId>) -> Self {
        Self {
            network_entity,
            created_by,
        }
    }

    pub fn network_entity(&self) -> NetworkEntity {
        self.network_entity
    }

    pub fn created_by(&self) -> Option<NetworkId> {
        self.created_by
    }
}

impl SyncComponent for NetworkIdentity {
    fn write(&self, writer: &mut ByteWriter) {
        writer.write_u64(self.network_entity.network_id.value());
        writer.write_u32(self.network_entity.entity_id);
        match self.created_by {
            Some(creator) => {
                writer.write_u8(1);
                writer.write_u64(creator.value());
            }
            None => writer.write_u8(0),
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

impl SchemaRead for NetworkIdentity {
    fn name() -> &'static str {
        "NetworkIdentity"
    }

    fn read(reader: &mut ByteReader) -> Result<Self, SchemaError> {
        let network_id = NetworkId::new(reader.read_u64()?);
        let entity_id = reader.read_u32()?;
        let created_by = match reader.read_u8()? {
            0 => None,
            1 => Some(NetworkId::new(reader.read_u64()?)),
            _ => {
                return Err(SchemaError::MalformedValue {
                    name: Self::name(),
                })
            }
        };
        Ok(Self {
            network_entity: NetworkEntity::new(network_id, entity_id),
            created_by,
        })
    }
}
