use thiserror::Error;

/// Lookup failure for an entity that has no mapping or record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("entity does not exist")]
pub struct EntityDoesNotExistError;
