//! Splits a buffer of complete messages into transport-sized frames.
//!
//! The chunker re-parses its input with the message codec to find
//! boundaries rather than slicing blindly, so no frame boundary ever falls
//! inside a single message. Packing is greedy: the next whole message is
//! appended to the current frame if it fits, otherwise the frame is closed
//! and a new one started.

use thiserror::Error;

use crate::message::RawMessageIter;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// A single message is larger than the frame limit. It can never be
    /// sent. A configuration or application error, not a transient one.
    #[error("message of {size} bytes exceeds the frame limit of {limit} bytes")]
    MessageExceedsFrameLimit { size: usize, limit: usize },

    /// The input did not consist purely of complete messages
    #[error("input ends with {remaining} bytes that form no complete message")]
    TruncatedInput { remaining: usize },
}

/// Split `payload`, a concatenation of complete encoded messages, into
/// frames of at most `max_frame_size` bytes, on message boundaries only.
pub fn chunk_messages(payload: &[u8], max_frame_size: usize) -> Result<Vec<Vec<u8>>, ChunkError> {
    let mut frames = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut iter = RawMessageIter::new(payload);

    for message in &mut iter {
        if message.len() > max_frame_size {
            return Err(ChunkError::MessageExceedsFrameLimit {
                size: message.len(),
                limit: max_frame_size,
            });
        }
        if !current.is_empty() && current.len() + message.len() > max_frame_size {
            frames.push(std::mem::take(&mut current));
        }
        current.extend_from_slice(message);
    }

    if iter.leftover() > 0 {
        return Err(ChunkError::TruncatedInput {
            remaining: iter.leftover(),
        });
    }
    if !current.is_empty() {
        frames.push(current);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        component::ComponentKind,
        message::{write_messages, CrdtMessage, MessageReader},
        world::Entity,
    };

    fn put(entity: u32, payload_len: usize) -> CrdtMessage {
        CrdtMessage::PutComponent {
            entity: Entity::new(entity),
            kind: ComponentKind::new(7),
            timestamp: 1,
            payload: vec![0xAB; payload_len].into_boxed_slice(),
        }
    }

    #[test]
    fn test_greedy_packing() {
        // each put is 8 (header) + 4 + 4 + 8 + 4 + 10 = 38 bytes
        let messages: Vec<CrdtMessage> = (0..5).map(|i| put(100 + i, 10)).collect();
        let payload = write_messages(&messages);

        let frames = chunk_messages(&payload, 80).unwrap();
        // two messages fit per 80-byte frame
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].len(), 76);
        assert_eq!(frames[1].len(), 76);
        assert_eq!(frames[2].len(), 38);
    }

    #[test]
    fn test_no_frame_splits_a_message() {
        let messages: Vec<CrdtMessage> = (0..7).map(|i| put(100 + i, (i * 7) as usize)).collect();
        let payload = write_messages(&messages);

        let frames = chunk_messages(&payload, 100).unwrap();
        for frame in &frames {
            // each frame alone decodes to whole messages with nothing left
            let decoded: Vec<CrdtMessage> = MessageReader::new(frame).collect();
            let reencoded = write_messages(&decoded);
            assert_eq!(&reencoded, frame);
        }
    }

    #[test]
    fn test_chunk_round_trip_preserves_order() {
        let messages: Vec<CrdtMessage> = (0..9).map(|i| put(100 + i, 5)).collect();
        let payload = write_messages(&messages);

        let frames = chunk_messages(&payload, 64).unwrap();
        let mut reassembled = Vec::new();
        for frame in frames {
            reassembled.extend_from_slice(&frame);
        }
        let decoded: Vec<CrdtMessage> = MessageReader::new(&reassembled).collect();
        assert_eq!(decoded, messages);
    }

    #[test]
    fn test_oversized_message_is_error() {
        let payload = write_messages(&[put(100, 200)]);
        let result = chunk_messages(&payload, 64);
        assert_eq!(
            result,
            Err(ChunkError::MessageExceedsFrameLimit {
                size: payload.len(),
                limit: 64
            })
        );
    }

    #[test]
    fn test_truncated_input_is_error() {
        let payload = write_messages(&[put(100, 10), put(101, 10)]);
        let truncated = &payload[..payload.len() - 3];
        let result = chunk_messages(truncated, 1024);
        assert_eq!(result, Err(ChunkError::TruncatedInput { remaining: 35 }));
    }

    #[test]
    fn test_empty_input_produces_no_frames() {
        assert_eq!(chunk_messages(&[], 1024).unwrap(), Vec::<Vec<u8>>::new());
    }
}
