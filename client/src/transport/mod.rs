cfg_if! {
    if #[cfg(feature = "transport_websocket")] {
        mod relay;
        mod websocket;

        pub use relay::{RelayConfig, RelayTransport};
        pub use websocket::{ConnectError, WebSocketTransport};
    } else {}
}
