use crate::{
    component::ComponentKind,
    types::Timestamp,
    world::{Entity, NetworkEntity},
};

use super::message_type::MessageType;

/// Fixed-size header preceding every message body:
/// `{ total-length: u32, type: u32 }`.
pub const HEADER_BYTES: usize = 8;

/// One state change to one entity or component; the unit of replication.
///
/// The three `*Network` variants carry the portable `(network-id, entity-id)`
/// identity in place of a process-local handle; all other fields are
/// identical between the two forms.
#[derive(Clone, Debug, PartialEq)]
pub enum CrdtMessage {
    PutComponent {
        entity: Entity,
        kind: ComponentKind,
        timestamp: Timestamp,
        payload: Box<[u8]>,
    },
    DeleteComponent {
        entity: Entity,
        kind: ComponentKind,
        timestamp: Timestamp,
    },
    DeleteEntity {
        entity: Entity,
    },
    PutComponentNetwork {
        entity: NetworkEntity,
        kind: ComponentKind,
        timestamp: Timestamp,
        payload: Box<[u8]>,
    },
    DeleteComponentNetwork {
        entity: NetworkEntity,
        kind: ComponentKind,
        timestamp: Timestamp,
    },
    DeleteEntityNetwork {
        entity: NetworkEntity,
    },
}

impl CrdtMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::PutComponent { .. } => MessageType::PutComponent,
            Self::DeleteComponent { .. } => MessageType::DeleteComponent,
            Self::DeleteEntity { .. } => MessageType::DeleteEntity,
            Self::PutComponentNetwork { .. } => MessageType::PutComponentNetwork,
            Self::DeleteComponentNetwork { .. } => MessageType::DeleteComponentNetwork,
            Self::DeleteEntityNetwork { .. } => MessageType::DeleteEntityNetwork,
        }
    }

    pub fn is_network_form(&self) -> bool {
        self.message_type().is_network_form()
    }

    pub fn local_entity(&self) -> Option<Entity> {
        match self {
            Self::PutComponent { entity, .. }
            | Self::DeleteComponent { entity, .. }
            | Self::DeleteEntity { entity } => Some(*entity),
            _ => None,
        }
    }

    pub fn network_entity(&self) -> Option<NetworkEntity> {
        match self {
            Self::PutComponentNetwork { entity, .. }
            | Self::DeleteComponentNetwork { entity, .. }
            | Self::DeleteEntityNetwork { entity } => Some(*entity),
            _ => None,
        }
    }

    pub fn component_kind(&self) -> Option<ComponentKind> {
        match self {
            Self::PutComponent { kind, .. }
            | Self::DeleteComponent { kind, .. }
            | Self::PutComponentNetwork { kind, .. }
            | Self::DeleteComponentNetwork { kind, .. } => Some(*kind),
            Self::DeleteEntity { .. } | Self::DeleteEntityNetwork { .. } => None,
        }
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::PutComponent { timestamp, .. }
            | Self::DeleteComponent { timestamp, .. }
            | Self::PutComponentNetwork { timestamp, .. }
            | Self::DeleteComponentNetwork { timestamp, .. } => Some(*timestamp),
            Self::DeleteEntity { .. } | Self::DeleteEntityNetwork { .. } => None,
        }
    }

    /// Substitute a portable identity for the local entity field.
    ///
    /// # Panics
    /// Panics if the message is already in network form.
    pub fn to_network_form(self, net_entity: NetworkEntity) -> CrdtMessage {
        match self {
            Self::PutComponent {
                kind,
                timestamp,
                payload,
                ..
            } => Self::PutComponentNetwork {
                entity: net_entity,
                kind,
                timestamp,
                payload,
            },
            Self::DeleteComponent {
                kind, timestamp, ..
            } => Self::DeleteComponentNetwork {
                entity: net_entity,
                kind,
                timestamp,
            },
            Self::DeleteEntity { .. } => Self::DeleteEntityNetwork { entity: net_entity },
            msg => panic!("message already in network form: {:?}", msg),
        }
    }

    /// Substitute a resolved local entity for the portable identity.
    ///
    /// # Panics
    /// Panics if the message is already in local form.
    pub fn to_local_form(self, entity: Entity) -> CrdtMessage {
        match self {
            Self::PutComponentNetwork {
                kind,
                timestamp,
                payload,
                ..
            } => Self::PutComponent {
                entity,
                kind,
                timestamp,
                payload,
            },
            Self::DeleteComponentNetwork {
                kind, timestamp, ..
            } => Self::DeleteComponent {
                entity,
                kind,
                timestamp,
            },
            Self::DeleteEntityNetwork { .. } => Self::DeleteEntity { entity },
            msg => panic!("message already in local form: {:?}", msg),
        }
    }

    /// Total encoded size of this message, header included. Used to detect
    /// messages that can never fit a transport frame before encoding.
    pub fn encoded_len(&self) -> usize {
        let entity_bytes = if self.is_network_form() { 12 } else { 4 };
        let body_bytes = match self {
            Self::PutComponent { payload, .. } | Self::PutComponentNetwork { payload, .. } => {
                entity_bytes + 4 + 8 + 4 + payload.len()
            }
            Self::DeleteComponent { .. } | Self::DeleteComponentNetwork { .. } => {
                entity_bytes + 4 + 8
            }
            Self::DeleteEntity { .. } | Self::DeleteEntityNetwork { .. } => entity_bytes,
        };
        HEADER_BYTES + body_bytes
    }
}
