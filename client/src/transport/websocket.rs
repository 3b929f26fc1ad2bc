use std::thread;

use futures_util::{SinkExt, StreamExt};
use log::warn;
use smol::{
    channel,
    channel::{Receiver, Sender, TryRecvError},
};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use weft_shared::{PacketReceiver, PacketSender, RecvError, SendError};

/// Why a websocket transport could not be set up
#[derive(Debug)]
pub struct ConnectError(pub String);

/// WebSocket client adapter. The socket lives on a dedicated I/O thread;
/// the host-facing endpoints are plain non-blocking queues, so sends are
/// fire-and-forget and receives drain once per tick like every other
/// transport.
///
/// Connection failures after setup surface as a closed transport: sends
/// start failing and `receive` returns an error. Reconnecting is the
/// host's decision.
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn connect(
        url: &str,
    ) -> Result<(Box<dyn PacketSender>, Box<dyn PacketReceiver>), ConnectError> {
        let (outbound_sender, outbound_receiver) = channel::unbounded::<Vec<u8>>();
        let (inbound_sender, inbound_receiver) = channel::unbounded::<Vec<u8>>();
        let url = url.to_string();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| ConnectError(error.to_string()))?;

        thread::Builder::new()
            .name("weft-websocket".into())
            .spawn(move || {
                runtime.block_on(socket_loop(url, outbound_receiver, inbound_sender));
            })
            .map_err(|error| ConnectError(error.to_string()))?;

        Ok((
            Box::new(WebSocketSender {
                sender: outbound_sender,
            }),
            Box::new(WebSocketReceiver {
                receiver: inbound_receiver,
            }),
        ))
    }
}

async fn socket_loop(
    url: String,
    outbound_receiver: Receiver<Vec<u8>>,
    inbound_sender: Sender<Vec<u8>>,
) {
    let (socket, _response) = match connect_async(url.as_str()).await {
        Ok(connected) => connected,
        Err(error) => {
            warn!("websocket connect to {} failed: {}", url, error);
            inbound_sender.close();
            return;
        }
    };
    let (mut sink, mut stream) = socket.split();

    let writer = async {
        while let Ok(payload) = outbound_receiver.recv().await {
            if sink.send(Message::Binary(payload)).await.is_err() {
                break;
            }
        }
    };
    let reader = async {
        while let Some(Ok(message)) = stream.next().await {
            if let Message::Binary(payload) = message {
                if inbound_sender.send(payload).await.is_err() {
                    break;
                }
            }
        }
        // remote side went away; stop delivery
        inbound_sender.close();
    };

    futures_util::join!(writer, reader);
}

struct WebSocketSender {
    sender: Sender<Vec<u8>>,
}

impl PacketSender for WebSocketSender {
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
struct WebSocketReceiver {
    receiver: Receiver<Vec<u8>>,
}

impl PacketReceiver for WebSocketReceiver {
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
