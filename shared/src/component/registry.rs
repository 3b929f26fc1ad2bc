use std::collections::HashMap;

use crate::bytes::{ByteReader, ByteWriter};

use super::{
    error::SchemaError,
    kind::ComponentKind,
    network_identity::NetworkIdentity,
    schema::{SchemaRead, SyncComponent},
    sync_set::SyncSet,
};

type ReadFn = fn(&mut ByteReader) -> Result<Box<dyn SyncComponent>, SchemaError>;

struct Schema {
    name: &'static str,
    read: ReadFn,
}

/// Maps each [`ComponentKind`] to the deserializer for that component type.
///
/// Built once at process start and immutable afterwards; passed explicitly
/// to every operation that touches payload bytes, so multiple independent
/// sessions can coexist in one process.
pub struct SchemaRegistry {
    schemas: HashMap<ComponentKind, Schema>,
}

impl SchemaRegistry {
    /// Creates a registry pre-populated with the built-in marker components
    /// ([`SyncSet`], [`NetworkIdentity`]) on their reserved kinds.
    pub fn new() -> Self {
        let mut registry = Self {
            schemas: HashMap::new(),
        };
        registry.register::<SyncSet>(SyncSet::KIND);
        registry.register::<NetworkIdentity>(NetworkIdentity::KIND);
        registry
    }

    /// Register a component type under the given kind.
    ///
    /// # Panics
    /// Panics if the kind is already taken. Ids are part of the session
    /// contract between peers; a collision is a programming error.
    pub fn register<C: SchemaRead>(&mut self, kind: ComponentKind) {
        let schema = Schema {
            name: C::name(),
            read: |reader| C::read(reader).map(|value| Box::new(value) as Box<dyn SyncComponent>),
        };
        if let Some(existing) = self.schemas.insert(kind, schema) {
            panic!(
                "component kind {:?} registered twice: '{}' collides with '{}'",
                kind,
                C::name(),
                existing.name
            );
        }
    }

    pub fn contains(&self, kind: &ComponentKind) -> bool {
        self.schemas.contains_key(kind)
    }

    pub fn name_of(&self, kind: &ComponentKind) -> Option<&'static str> {
        self.schemas.get(kind).map(|schema| schema.name)
    }

    /// Deserialize a component value of the given kind
    pub fn read(
        &self,
        kind: &ComponentKind,
        reader: &mut ByteReader,
    ) -> Result<Box<dyn SyncComponent>, SchemaError> {
        let schema = self.schemas.get(kind).ok_or(SchemaError::UnknownKind {
            kind: kind.value(),
        })?;
        (schema.read)(reader)
    }

    /// Serialize a component value into a standalone payload
    pub fn write_payload(&self, value: &dyn SyncComponent) -> Box<[u8]> {
        let mut writer = ByteWriter::new();
        value.write(&mut writer);
        writer.to_bytes().into_boxed_slice()
    }

    /// Check that a payload deserializes cleanly against the schema for
    /// `kind`. Used by validation before a message is applied or forwarded.
    pub fn validate_payload(
        &self,
        kind: &ComponentKind,
        payload: &[u8],
    ) -> Result<Box<dyn SyncComponent>, SchemaError> {
        let mut reader = ByteReader::new(payload);
        self.read(kind, &mut reader)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds_present() {
        let registry = SchemaRegistry::new();
        assert!(registry.contains(&SyncSet::KIND));
        assert!(registry.contains(&NetworkIdentity::KIND));
        assert_eq!(registry.name_of(&SyncSet::KIND), Some("SyncSet"));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_kind_collision_panics() {
        let mut registry = SchemaRegistry::new();
        registry.register::<SyncSet>(NetworkIdentity::KIND);
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let registry = SchemaRegistry::new();
        let result = registry.validate_payload(&ComponentKind::new(999), &[0, 0, 0, 0]);
        assert_eq!(result.unwrap_err(), SchemaError::UnknownKind { kind: 999 });
    }
}
