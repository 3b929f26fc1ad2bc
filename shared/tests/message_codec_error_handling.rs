/// Integration tests for the CRDT message codec's handling of malformed
/// input.
///
/// The decoder sits directly behind the transport and processes untrusted
/// network data; nothing here may panic or error across that boundary.
/// Truncated trailing data ends iteration (the caller buffers and retries),
/// unknown type tags are skipped exactly, and unrecoverable headers discard
/// the remainder of the buffer.
mod common;

use common::{position_payload, POSITION};

use weft_shared::{
    write_message, write_messages, ByteWriter, ComponentKind, CrdtMessage, Entity, MessageReader,
    NetworkEntity, NetworkId, RawMessageIter, HEADER_BYTES,
};

fn sample_messages() -> Vec<CrdtMessage> {
    let net_entity = NetworkEntity::new(NetworkId::new(7), 42);
    vec![
        CrdtMessage::PutComponent {
            entity: Entity::new(100),
            kind: POSITION,
            timestamp: 1,
            payload: position_payload(1.0, 2.0, 3.0),
        },
        CrdtMessage::DeleteComponent {
            entity: Entity::new(100),
            kind: POSITION,
            timestamp: 2,
        },
        CrdtMessage::DeleteEntity {
            entity: Entity::new(100),
        },
        CrdtMessage::PutComponentNetwork {
            entity: net_entity,
            kind: POSITION,
            timestamp: 3,
            payload: position_payload(9.0, 9.0, 9.0),
        },
        CrdtMessage::DeleteComponentNetwork {
            entity: net_entity,
            kind: POSITION,
            timestamp: 4,
        },
        CrdtMessage::DeleteEntityNetwork { entity: net_entity },
    ]
}

// ========== Well-formed input ==========

#[test]
fn test_round_trip_all_variants() {
    let messages = sample_messages();
    let bytes = write_messages(&messages);

    let decoded: Vec<CrdtMessage> = MessageReader::new(&bytes).collect();
    assert_eq!(decoded, messages);
}

#[test]
fn test_declared_length_matches_encoded_length() {
    for message in sample_messages() {
        let mut writer = ByteWriter::new();
        write_message(&message, &mut writer);
        let bytes = writer.to_bytes();
        assert_eq!(bytes.len(), message.encoded_len());

        let declared = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        assert_eq!(declared, bytes.len());
    }
}

#[test]
fn test_empty_buffer_yields_nothing() {
    assert_eq!(MessageReader::new(&[]).count(), 0);
}

// ========== Truncated input ==========

#[test]
fn test_truncated_header_ends_iteration() {
    let bytes = write_messages(&sample_messages());
    // fewer bytes than a header can hold
    let decoded: Vec<CrdtMessage> = MessageReader::new(&bytes[..HEADER_BYTES - 1]).collect();
    assert!(decoded.is_empty());
}

#[test]
fn test_truncated_body_ends_iteration() {
    let messages = sample_messages();
    let bytes = write_messages(&messages);

    // cut into the final message: everything before it still decodes,
    // the partial tail is left for the caller to complete later
    let last_len = messages.last().unwrap().encoded_len();
    let cut = bytes.len() - last_len + 3;
    let decoded: Vec<CrdtMessage> = MessageReader::new(&bytes[..cut]).collect();
    assert_eq!(decoded, messages[..messages.len() - 1]);
}

#[test]
fn test_single_partial_message_yields_nothing() {
    let bytes = write_messages(&sample_messages()[..1]);
    for cut in 0..bytes.len() {
        let decoded: Vec<CrdtMessage> = MessageReader::new(&bytes[..cut]).collect();
        assert!(decoded.is_empty(), "partial prefix of {} bytes decoded", cut);
    }
}

// ========== Unrecoverable headers ==========

#[test]
fn test_absurd_declared_length_discards_remainder() {
    // a declared length smaller than the header itself leaves no way to
    // find the next boundary
    let mut writer = ByteWriter::new();
    writer.write_u32(3);
    writer.write_u32(0);
    write_message(&sample_messages()[0], &mut writer);

    let decoded: Vec<CrdtMessage> = MessageReader::new(writer.as_slice()).collect();
    assert!(decoded.is_empty());
}

#[test]
fn test_zero_length_header_does_not_loop_forever() {
    let mut writer = ByteWriter::new();
    writer.write_u32(0);
    writer.write_u32(0);

    let decoded: Vec<CrdtMessage> = MessageReader::new(writer.as_slice()).collect();
    assert!(decoded.is_empty());
}

// ========== Unknown type tags ==========

#[test]
fn test_unknown_tag_skipped_exactly() {
    let mut writer = ByteWriter::new();
    // a future message type: 20 bytes of body this decoder cannot parse
    writer.write_u32((HEADER_BYTES + 20) as u32);
    writer.write_u32(999);
    writer.write_bytes(&[0xEE; 20]);
    let valid = sample_messages();
    write_message(&valid[0], &mut writer);

    let decoded: Vec<CrdtMessage> = MessageReader::new(writer.as_slice()).collect();
    assert_eq!(decoded, valid[..1]);
}

#[test]
fn test_unknown_tag_alone_yields_nothing() {
    let mut writer = ByteWriter::new();
    writer.write_u32(HEADER_BYTES as u32);
    writer.write_u32(u32::MAX);

    assert_eq!(MessageReader::new(writer.as_slice()).count(), 0);
}

// ========== Malformed bodies inside well-delimited messages ==========

#[test]
fn test_bad_body_dropped_and_iteration_resumes() {
    // declared length is consistent, but the body is too short for a put
    let mut writer = ByteWriter::new();
    writer.write_u32((HEADER_BYTES + 4) as u32);
    writer.write_u32(0); // put-component tag
    writer.write_u32(100); // entity only; kind/timestamp/payload missing
    let valid = sample_messages();
    write_message(&valid[1], &mut writer);

    let decoded: Vec<CrdtMessage> = MessageReader::new(writer.as_slice()).collect();
    assert_eq!(decoded, valid[1..2]);
}

#[test]
fn test_payload_length_overrunning_body_is_dropped() {
    // the payload length field claims more bytes than the message holds
    let mut writer = ByteWriter::new();
    let body_len = 4 + 4 + 8 + 4 + 2;
    writer.write_u32((HEADER_BYTES + body_len) as u32);
    writer.write_u32(0); // put-component tag
    writer.write_u32(100);
    writer.write_u32(POSITION.value());
    writer.write_u64(1);
    writer.write_u32(1_000); // declared payload far past the body
    writer.write_bytes(&[1, 2]);
    let valid = sample_messages();
    write_message(&valid[2], &mut writer);

    let decoded: Vec<CrdtMessage> = MessageReader::new(writer.as_slice()).collect();
    assert_eq!(decoded, valid[2..3]);
}

// ========== Raw boundary iteration ==========

#[test]
fn test_raw_iter_spans_concatenate_to_input() {
    let bytes = write_messages(&sample_messages());
    let mut iter = RawMessageIter::new(&bytes);

    let mut reassembled = Vec::new();
    for span in &mut iter {
        reassembled.extend_from_slice(span);
    }
    assert_eq!(reassembled, bytes);
    assert_eq!(iter.leftover(), 0);
}

#[test]
fn test_raw_iter_reports_leftover_on_truncation() {
    let bytes = write_messages(&sample_messages()[..2]);
    let truncated = &bytes[..bytes.len() - 5];

    let mut iter = RawMessageIter::new(truncated);
    let first = iter.next().unwrap();
    assert_eq!(first.len(), sample_messages()[0].encoded_len());
    assert_eq!(iter.next(), None);
    assert_eq!(iter.leftover(), truncated.len() - first.len());
}

#[test]
fn test_raw_iter_yields_unknown_tags() {
    // boundary iteration forwards messages it cannot interpret
    let mut writer = ByteWriter::new();
    writer.write_u32((HEADER_BYTES + 4) as u32);
    writer.write_u32(777);
    writer.write_u32(0xDEAD);

    let spans: Vec<&[u8]> = RawMessageIter::new(writer.as_slice()).collect();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].len(), HEADER_BYTES + 4);
}

#[test]
fn test_messages_survive_kind_check_mismatch() {
    // a message whose component kind is unknown still decodes; schema
    // validation is the applier's concern, not the codec's
    let message = CrdtMessage::PutComponent {
        entity: Entity::new(5),
        kind: ComponentKind::new(12345),
        timestamp: 9,
        payload: vec![1, 2, 3].into_boxed_slice(),
    };
    let bytes = write_messages(std::slice::from_ref(&message));
    let decoded: Vec<CrdtMessage> = MessageReader::new(&bytes).collect();
    assert_eq!(decoded, vec![message]);
}
