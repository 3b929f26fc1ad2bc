use crate::world::NetworkId;

/// Ephemeral record of a peer's presence in the session. Created when the
/// peer joins, deleted when it leaves; consulted only by the bootstrap
/// election, never by steady-state replication.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeerJoinRecord {
    pub network_id: NetworkId,
    /// Wall-clock milliseconds at join, as announced by the peer. Only
    /// relative order matters.
    pub join_timestamp: u64,
}

impl PeerJoinRecord {
    pub fn new(network_id: NetworkId, join_timestamp: u64) -> Self {
        Self {
            network_id,
            join_timestamp,
        }
    }
}
