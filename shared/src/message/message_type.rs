// Wire tags for the CRDT message header. New tags may be added by future
// protocol revisions; decoders skip tags they do not recognize by consuming
// the declared message length.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum MessageType {
    PutComponent,
    DeleteComponent,
    DeleteEntity,
    PutComponentNetwork,
    DeleteComponentNetwork,
    DeleteEntityNetwork,
}

impl MessageType {
    pub fn tag(&self) -> u32 {
        match self {
            Self::PutComponent => 0,
            Self::DeleteComponent => 1,
            Self::DeleteEntity => 2,
            Self::PutComponentNetwork => 3,
            Self::DeleteComponentNetwork => 4,
            Self::DeleteEntityNetwork => 5,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::PutComponent),
            1 => Some(Self::DeleteComponent),
            2 => Some(Self::DeleteEntity),
            3 => Some(Self::PutComponentNetwork),
            4 => Some(Self::DeleteComponentNetwork),
            5 => Some(Self::DeleteEntityNetwork),
            _ => None,
        }
    }

    pub fn is_network_form(&self) -> bool {
        matches!(
            self,
            Self::PutComponentNetwork | Self::DeleteComponentNetwork | Self::DeleteEntityNetwork
        )
    }
}
