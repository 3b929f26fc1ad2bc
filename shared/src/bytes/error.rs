use thiserror::Error;

/// Errors produced by the byte-level read cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    /// A read reached past the end of the buffer. Expected whenever a
    /// partially transmitted message sits at the tail of a receive buffer.
    #[error("buffer underrun: needed {needed} more bytes, {remaining} remaining")]
    Underrun { needed: usize, remaining: usize },
}
