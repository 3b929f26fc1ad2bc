use thiserror::Error;

use crate::bytes::ReadError;

/// Errors that can occur while reading a component value against its schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The payload ended before the schema finished reading it
    #[error("schema read failed: {0}")]
    Read(#[from] ReadError),

    /// No schema is registered under the given component kind
    #[error("unknown component kind: {kind}")]
    UnknownKind { kind: u32 },

    /// The payload decoded structurally but violated a schema constraint
    #[error("malformed value for component '{name}'")]
    MalformedValue { name: &'static str },
}
