//! Last-write-wins conflict resolution, applied per (entity, component).
//!
//! Resolution is pure: callers pass the stored `(timestamp, value)` pair and
//! mutate only on an accepting outcome. Applying the same message twice, or
//! out of order with respect to a lower-timestamp message, converges to the
//! same state: idempotence and commutativity both fall out of the strict
//! timestamp comparison.

use crate::{component::SyncComponent, types::Timestamp};

/// Timestamp writers stamp on the first-ever write of a component. Incoming
/// messages at or below this value are the bootstrap fast path for newly
/// created components: no stored slot exists yet, so they are accepted
/// without comparison.
pub const FIRST_WRITE_TIMESTAMP: Timestamp = 1;

/// Outcome of resolving one incoming message against stored state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resolution {
    /// Incoming timestamp is newer and the value differs: overwrite both
    AcceptNewValue,
    /// Incoming timestamp is newer but the value is identical: bump the
    /// stored clock only
    AcceptTimestampOnly,
    /// The addressed entity has been deleted; deletion wins over any
    /// pending put or delete regardless of per-component timestamps
    EntityDeleted,
    /// Incoming timestamp is not newer. Silently rejected; an expected
    /// consequence of concurrent writers, not an error
    RejectStale,
}

impl Resolution {
    pub fn accepted(&self) -> bool {
        matches!(self, Self::AcceptNewValue | Self::AcceptTimestampOnly)
    }
}

/// Resolve an incoming `(timestamp, value)` against the stored slot for the
/// same (entity, component). `current` is `None` when the component has
/// never been seen; a stored `None` value is a delete tombstone. `incoming`
/// value is `None` for delete-component messages.
pub fn resolve(
    entity_deleted: bool,
    current: Option<(Timestamp, Option<&dyn SyncComponent>)>,
    incoming_timestamp: Timestamp,
    incoming_value: Option<&dyn SyncComponent>,
) -> Resolution {
    if entity_deleted {
        return Resolution::EntityDeleted;
    }

    let Some((stored_timestamp, stored_value)) = current else {
        return Resolution::AcceptNewValue;
    };

    // equal timestamps are a no-op
    if incoming_timestamp <= stored_timestamp {
        return Resolution::RejectStale;
    }

    let same_value = match (incoming_value, stored_value) {
        (None, None) => true,
        (Some(incoming), Some(stored)) => incoming.equals(stored),
        _ => false,
    };

    if same_value {
        Resolution::AcceptTimestampOnly
    } else {
        Resolution::AcceptNewValue
    }
}
