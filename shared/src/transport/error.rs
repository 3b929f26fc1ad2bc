use thiserror::Error;

/// Outbound enqueue failed; the transport is closed or gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transport send failed: endpoint closed")]
pub struct SendError;

/// The transport failed or disconnected. Surfaced to the host as a
/// reconnect/backoff decision; the synchronization core holds no retry
/// policy of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transport receive failed: endpoint closed")]
pub struct RecvError;
