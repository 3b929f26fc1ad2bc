use std::any::Any;

use crate::bytes::{ByteReader, ByteWriter};

use super::error::SchemaError;

/// Object-safe contract implemented by every replicated component type.
///
/// A `SyncComponent` owns its own serialization; the matching deserializer
/// is registered per-kind in the [`SchemaRegistry`](super::SchemaRegistry).
/// `equals` drives the same-value-newer-timestamp fast path in conflict
/// resolution, so it must compare replicated state only.
pub trait SyncComponent: Any + Send + Sync {
    /// Serialize the replicated state of this value
    fn write(&self, writer: &mut ByteWriter);

    /// Clone into a new boxed trait object
    fn boxed_clone(&self) -> Box<dyn SyncComponent>;

    /// Compare replicated state against another value of any component type.
    /// Values of different concrete types are never equal.
    fn equals(&self, other: &dyn SyncComponent) -> bool;

    /// Cast to a boxed Any, for downcasting to the concrete type
    fn to_boxed_any(self: Box<Self>) -> Box<dyn Any>;

    /// Cast to an Any reference, for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn SyncComponent> {
    fn clone(&self) -> Box<dyn SyncComponent> {
        self.boxed_clone()
    }
}

impl std::fmt::Debug for dyn SyncComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn SyncComponent")
    }
}

/// The deserialization half of a component schema. Implemented by concrete
/// component types so they can be registered with a [`SchemaRegistry`].
pub trait SchemaRead: SyncComponent + Sized {
    /// Human-readable type name, used in diagnostics
    fn name() -> &'static str;

    /// Deserialize a value previously produced by [`SyncComponent::write`]
    fn read(reader: &mut ByteReader) -> Result<Self, SchemaError>;
}

impl dyn SyncComponent {
    /// Downcast a reference to a concrete component type
    pub fn downcast_ref<C: SyncComponent>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }
}
