use weft_shared::{PacketReceiver, PacketSender, DEFAULT_MAX_FRAME_SIZE};

use super::websocket::{ConnectError, WebSocketTransport};

/// Relay deployments speak the websocket protocol through a shared relay
/// process that broadcasts frames to every other participant in a session.
/// The adapter differs only in how the endpoint URL is formed and in its
/// conservative frame limit; pass `max_frame_size` into the
/// `SessionConfig` so the chunker honors it.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub url: String,
    /// Session identifier, appended to the relay URL
    pub session: String,
    pub max_frame_size: usize,
}

impl RelayConfig {
    pub fn new(url: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            session: session.into(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

pub struct RelayTransport;

impl RelayTransport {
    pub fn connect(
        config: &RelayConfig,
    ) -> Result<(Box<dyn PacketSender>, Box<dyn PacketReceiver>), ConnectError> {
        let url = format!("{}/{}", config.url.trim_end_matches('/'), config.session);
        WebSocketTransport::connect(&url)
    }
}
