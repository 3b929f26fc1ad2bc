use std::time::Duration;

use crate::{types::HostRole, world::NetworkId};

/// Frame limit of relay-style transports. A tuning value, not a protocol
/// constant; override it per transport via [`SessionConfig`].
pub const DEFAULT_MAX_FRAME_SIZE: usize = 12 * 1024;

pub const DEFAULT_RESERVED_ENTITY_THRESHOLD: u32 = 16;

pub const DEFAULT_BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(2);

/// Collaborator-supplied configuration for one replication session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub role: HostRole,
    /// Entity ids below this are reserved for host-internal use and are
    /// never synchronized
    pub reserved_entity_threshold: u32,
    /// Upper bound on a single outbound chunk, in bytes
    pub max_frame_size: usize,
    /// How long a joining peer waits for a full-state response before
    /// assuming it is the first peer
    pub bootstrap_timeout: Duration,
    /// Stable peer identity. Required for clients; a server without one
    /// derives a random loopback identity.
    pub network_id: Option<NetworkId>,
}

impl SessionConfig {
    pub fn server() -> Self {
        Self {
            role: HostRole::Server,
            ..Self::client()
        }
    }

    pub fn client() -> Self {
        Self {
            role: HostRole::Client,
            reserved_entity_threshold: DEFAULT_RESERVED_ENTITY_THRESHOLD,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            bootstrap_timeout: DEFAULT_BOOTSTRAP_TIMEOUT,
            network_id: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::client()
    }
}
