use weft_shared::{ComponentKind, Entity, NetworkEntity, NetworkId};

use crate::peer::PeerKey;

/// Everything the host engine needs to react to, surfaced once per
/// `receive` call in the order it happened.
#[derive(Debug)]
pub enum ServerEvent {
    PeerJoined {
        key: PeerKey,
        network_id: NetworkId,
    },
    PeerLeft {
        key: PeerKey,
        network_id: NetworkId,
    },
    /// A validated put was applied to the authoritative world
    ComponentUpdated {
        entity: Entity,
        kind: ComponentKind,
        author: NetworkId,
    },
    /// A validated component delete was applied
    ComponentRemoved {
        entity: Entity,
        kind: ComponentKind,
        author: NetworkId,
    },
    /// A validated entity delete was applied
    EntityDespawned {
        entity: Entity,
        author: NetworkId,
    },
    SelectionChanged {
        network_id: NetworkId,
        entity: Option<NetworkEntity>,
    },
    FilesystemEvent {
        from: NetworkId,
        payload: Vec<u8>,
    },
    /// The peer's transport failed or closed; its records were removed
    TransportClosed {
        key: PeerKey,
        network_id: NetworkId,
    },
}
