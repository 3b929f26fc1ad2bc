use weft_shared::{NetworkEntity, NetworkId, PacketReceiver, PacketSender, PeerJoinRecord};

/// Handle for one connected peer, valid for the lifetime of its connection.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct PeerKey(u64);

impl PeerKey {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

/// Server-side state for one connected peer: its identity, join record,
/// transport endpoints, and editor presence.
pub struct Peer {
    network_id: NetworkId,
    join_timestamp: u64,
    pub(crate) sender: Box<dyn PacketSender>,
    pub(crate) receiver: Box<dyn PacketReceiver>,
    pub(crate) selected: Option<NetworkEntity>,
}

impl Peer {
    pub(crate) fn new(
        network_id: NetworkId,
        join_timestamp: u64,
        sender: Box<dyn PacketSender>,
        receiver: Box<dyn PacketReceiver>,
    ) -> Self {
        Self {
            network_id,
            join_timestamp,
            sender,
            receiver,
            selected: None,
        }
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn join_timestamp(&self) -> u64 {
        self.join_timestamp
    }

    pub(crate) fn set_join_timestamp(&mut self, join_timestamp: u64) {
        self.join_timestamp = join_timestamp;
    }

    pub fn selected(&self) -> Option<NetworkEntity> {
        self.selected
    }

    pub fn join_record(&self) -> PeerJoinRecord {
        PeerJoinRecord::new(self.network_id, self.join_timestamp)
    }
}
