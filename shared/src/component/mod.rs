mod error;
mod kind;
mod network_identity;
mod registry;
mod schema;
mod sync_set;

pub use error::SchemaError;
pub use kind::ComponentKind;
pub use network_identity::NetworkIdentity;
pub use registry::SchemaRegistry;
pub use schema::{SchemaRead, SyncComponent};
pub use sync_set::SyncSet;
