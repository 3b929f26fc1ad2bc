use crate::world::NetworkId;

use super::join_record::PeerJoinRecord;

/// The oldest connected peer: smallest join timestamp, ties broken by the
/// smaller network id so every peer elects the same winner from the same
/// records.
pub fn oldest<'r>(records: impl Iterator<Item = &'r PeerJoinRecord>) -> Option<NetworkId> {
    records
        .min_by_key(|record| (record.join_timestamp, record.network_id.value()))
        .map(|record| record.network_id)
}

/// Whether `network_id` wins the election over the given records. The
/// caller includes its own record; a peer that knows of no one (including
/// itself) owns nothing.
pub fn is_oldest<'r>(
    network_id: NetworkId,
    records: impl Iterator<Item = &'r PeerJoinRecord>,
) -> bool {
    oldest(records) == Some(network_id)
}
