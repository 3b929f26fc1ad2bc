use smol::{
    channel,
    channel::{Receiver, Sender, TryRecvError},
};

use super::{PacketReceiver, PacketSender, RecvError, SendError};

/// In-process transport, used by the renderer peer living in the same
/// process as the server, and by tests.
pub struct PacketChannel;

impl PacketChannel {
    /// A connected bidirectional pair of endpoints.
    pub fn pair() -> (ChannelTransport, ChannelTransport) {
        let (near_sender, far_receiver) = channel::unbounded();
        let (far_sender, near_receiver) = channel::unbounded();
        (
            ChannelTransport {
                sender: near_sender,
                receiver: near_receiver,
            },
            ChannelTransport {
                sender: far_sender,
                receiver: far_receiver,
            },
        )
    }
}

/// One endpoint of an in-process pair.
pub struct ChannelTransport {
    sender: Sender<Vec<u8>>,
    receiver: Receiver<Vec<u8>>,
}

impl ChannelTransport {
    pub fn split(self) -> (Box<dyn PacketSender>, Box<dyn PacketReceiver>) {
        (
            Box::new(ChannelSender {
                sender: self.sender,
            }),
            Box::new(ChannelReceiver {
                receiver: self.receiver,
            }),
        )
    }
}

struct ChannelSender {
    sender: Sender<Vec<u8>>,
}

impl PacketSender for ChannelSender {
    fn send(&self, payload: &[u8]) -> Result<(), SendError> {
        // unbounded, so this never actually blocks
        self.sender
            .send_blocking(payload.to_vec())
            .map_err(|_| SendError)
    }

    fn close(&self) {
        self.sender.close();
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[derive(Clone)]
struct ChannelReceiver {
    receiver: Receiver<Vec<u8>>,
}

impl PacketReceiver for ChannelReceiver {
    fn receive(&mut self) -> Result<Option<Vec<u8>>, RecvError> {
        match self.receiver.try_recv() {
            Ok(payload) => Ok(Some(payload)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(RecvError),
        }
    }

    fn close(&mut self) {
        self.receiver.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_delivers_both_directions() {
        let (near, far) = PacketChannel::pair();
        let (near_sender, mut near_receiver) = near.split();
        let (far_sender, mut far_receiver) = far.split();

        near_sender.send(&[1, 2, 3]).unwrap();
        far_sender.send(&[4]).unwrap();

        assert_eq!(far_receiver.receive().unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(far_receiver.receive().unwrap(), None);
        assert_eq!(near_receiver.receive().unwrap(), Some(vec![4]));
    }

    #[test]
    fn test_close_is_idempotent_and_stops_delivery() {
        let (near, far) = PacketChannel::pair();
        let (near_sender, _near_receiver) = near.split();
        let (_far_sender, mut far_receiver) = far.split();

        near_sender.close();
        near_sender.close();
        assert!(near_sender.is_closed());
        assert!(near_sender.send(&[9]).is_err());
        assert_eq!(far_receiver.receive(), Err(RecvError));
    }
}
