mod channel;
mod error;
mod filter;

pub use channel::{ChannelTransport, PacketChannel};
pub use error::{RecvError, SendError};
pub use filter::{replication_eligible, MessageFilter};

/// Sends one logical chunk of bytes. Must never block the caller; sends
/// are fire-and-forget against whatever queue the adapter maintains.
pub trait PacketSender: Send + Sync {
    fn send(&self, payload: &[u8]) -> Result<(), SendError>;

    /// Idempotent. After close, sends fail and nothing further is
    /// delivered to the remote side.
    fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Receives logical chunks, one per call, drained once per tick.
pub trait PacketReceiver: PacketReceiverClone + Send + Sync {
    /// `Ok(None)` means no chunk is waiting; `Err` means the transport
    /// failed or was closed by the remote side.
    fn receive(&mut self) -> Result<Option<Vec<u8>>, RecvError>;

    /// Idempotent. Stops further delivery.
    fn close(&mut self);
}

/// Used to clone Box<dyn PacketReceiver>
pub trait PacketReceiverClone {
    fn clone_box(&self) -> Box<dyn PacketReceiver>;
}

impl<T: 'static + PacketReceiver + Clone> PacketReceiverClone for T {
    fn clone_box(&self) -> Box<dyn PacketReceiver> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn PacketReceiver> {
    fn clone(&self) -> Box<dyn PacketReceiver> {
        PacketReceiverClone::clone_box(self.as_ref())
    }
}
