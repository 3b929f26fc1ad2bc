use weft_shared::{ComponentKind, Entity, NetworkEntity, NetworkId};

/// Everything the host engine needs to react to, surfaced once per tick in
/// the order it happened.
#[derive(Debug)]
pub enum ClientEvent {
    /// Bootstrap finished: either the first full-state response was
    /// applied, or the timeout elapsed and this peer is the first in the
    /// session
    Synced,
    PeerJoined(NetworkId),
    PeerLeft(NetworkId),
    /// A network entity was seen for the first time and given a local
    /// handle
    EntitySpawned {
        entity: Entity,
        net_entity: NetworkEntity,
    },
    ComponentUpdated {
        entity: Entity,
        kind: ComponentKind,
    },
    ComponentRemoved {
        entity: Entity,
        kind: ComponentKind,
    },
    EntityDespawned {
        entity: Entity,
    },
    SelectionChanged {
        network_id: NetworkId,
        entity: Option<NetworkEntity>,
    },
    FilesystemEvent(Vec<u8>),
    /// The transport failed or closed; the host owns reconnect policy.
    /// Re-sending state after a reconnect is safe under last-write-wins.
    TransportClosed,
}
