//! Codec Tests
//!
//! Cursor decoding, command/reply encoding, and frame I/O.

use std::io;

use portkv::error::ExitStatus;
use portkv::protocol::{
    decode_command, decode_reply, encode_command, encode_reply, read_frame, read_reply,
    write_command, write_reply, Command, Cursor, Reply, Status,
};

// =============================================================================
// Cursor Tests
// =============================================================================

#[test]
fn cursor_reads_big_endian_u32() {
    let buf = [0x00, 0x00, 0x01, 0x02, 0xAA];
    let mut cursor = Cursor::new(&buf);

    assert_eq!(cursor.read_u32(), Some(258));
    assert_eq!(cursor.remaining(), 1);
}

#[test]
fn cursor_u32_failure_leaves_cursor_untouched() {
    let buf = [0x01, 0x02, 0x03];
    let mut cursor = Cursor::new(&buf);

    assert_eq!(cursor.read_u32(), None);
    assert_eq!(cursor.remaining(), 3);
}

#[test]
fn cursor_binary_round_trip_consumes_exactly_prefix_plus_payload() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&5u32.to_be_bytes());
    buf.extend_from_slice(b"hello");
    buf.extend_from_slice(b"rest");

    let mut cursor = Cursor::new(&buf);
    let before = cursor.remaining();

    let bytes = cursor.read_binary().unwrap();
    assert_eq!(bytes, b"hello");
    assert_eq!(before - cursor.remaining(), 4 + 5);
    assert_eq!(cursor.remaining(), 4);
}

#[test]
fn cursor_binary_short_payload_leaves_cursor_untouched() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&10u32.to_be_bytes());
    buf.extend_from_slice(b"short");

    let mut cursor = Cursor::new(&buf);
    assert_eq!(cursor.read_binary(), None);
    assert_eq!(cursor.remaining(), 9);
}

#[test]
fn cursor_binary_missing_prefix_fails() {
    let buf = [0x00, 0x00];
    let mut cursor = Cursor::new(&buf);

    assert_eq!(cursor.read_binary(), None);
    assert_eq!(cursor.remaining(), 2);
}

#[test]
fn cursor_empty_binary_is_valid() {
    let buf = 0u32.to_be_bytes();
    let mut cursor = Cursor::new(&buf);

    assert_eq!(cursor.read_binary(), Some(&[] as &[u8]));
    assert!(cursor.is_empty());
}

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn encode_decode_close() {
    let bytes = encode_command(&Command::Close);
    assert_eq!(bytes, 0u32.to_be_bytes());
    assert_eq!(decode_command(&bytes).unwrap(), Command::Close);
}

#[test]
fn encode_decode_flush() {
    let bytes = encode_command(&Command::Flush);
    assert_eq!(decode_command(&bytes).unwrap(), Command::Flush);
}

#[test]
fn encode_decode_put() {
    let bytes = encode_command(&Command::Put {
        key: b"mykey",
        value: b"myvalue",
    });
    match decode_command(&bytes).unwrap() {
        Command::Put { key, value } => {
            assert_eq!(key, b"mykey");
            assert_eq!(value, b"myvalue");
        }
        other => panic!("expected PUT, got {:?}", other),
    }
}

#[test]
fn encode_decode_get() {
    let bytes = encode_command(&Command::Get { key: b"hello" });
    assert_eq!(decode_command(&bytes).unwrap(), Command::Get { key: b"hello" });
}

#[test]
fn encode_decode_delete() {
    let bytes = encode_command(&Command::Delete { key: b"gone" });
    assert_eq!(
        decode_command(&bytes).unwrap(),
        Command::Delete { key: b"gone" }
    );
}

#[test]
fn decode_short_buffer_is_bad_command() {
    let err = decode_command(&[0x00, 0x01]).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::BadCommand);

    let err = decode_command(&[]).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::BadCommand);
}

#[test]
fn decode_unknown_opcode_is_bad_command() {
    let err = decode_command(&99u32.to_be_bytes()).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::BadCommand);

    let err = decode_command(&u32::MAX.to_be_bytes()).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::BadCommand);
}

#[test]
fn decode_trailing_byte_is_fatal_for_every_opcode() {
    let commands = [
        Command::Close,
        Command::Flush,
        Command::Put {
            key: b"k",
            value: b"v",
        },
        Command::Get { key: b"k" },
        Command::Delete { key: b"k" },
    ];

    for command in commands {
        let mut bytes = encode_command(&command);
        bytes.push(0xFF);

        let err = decode_command(&bytes).unwrap_err();
        assert_eq!(
            err.exit_status(),
            ExitStatus::TrailingData,
            "opcode {:?}",
            command.opcode()
        );
    }
}

#[test]
fn decode_put_truncated_key_is_bad_user_key() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2u32.to_be_bytes()); // PUT_USER_KV
    bytes.extend_from_slice(&8u32.to_be_bytes()); // claims 8 key bytes
    bytes.extend_from_slice(b"abc");

    let err = decode_command(&bytes).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::BadUserKey);
}

#[test]
fn decode_put_missing_value_is_bad_user_value() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2u32.to_be_bytes()); // PUT_USER_KV
    bytes.extend_from_slice(&3u32.to_be_bytes());
    bytes.extend_from_slice(b"key");

    let err = decode_command(&bytes).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::BadUserValue);
}

#[test]
fn decode_get_missing_key_is_bad_user_key() {
    let err = decode_command(&3u32.to_be_bytes()).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::BadUserKey);
}

// =============================================================================
// Reply Encoding/Decoding Tests
// =============================================================================

#[test]
fn encode_decode_ok_reply_with_payload() {
    let reply = Reply::ok(Some(b"value".to_vec()));
    let frame = encode_reply(&reply);

    // Outer frame: len covers status byte + payload
    assert_eq!(&frame[..4], 6u32.to_be_bytes());
    assert_eq!(frame[4], 0);

    let decoded = decode_reply(&frame[4..]).unwrap();
    assert_eq!(decoded, reply);
}

#[test]
fn encode_decode_empty_replies() {
    for reply in [Reply::ok_empty(), Reply::error_empty()] {
        let frame = encode_reply(&reply);
        assert_eq!(&frame[..4], 1u32.to_be_bytes());

        let decoded = decode_reply(&frame[4..]).unwrap();
        assert_eq!(decoded, reply);
    }
}

#[test]
fn decode_reply_unknown_status_fails() {
    assert!(decode_reply(&[0x7F]).is_err());
    assert!(decode_reply(&[]).is_err());
}

// =============================================================================
// Frame I/O Tests
// =============================================================================

#[test]
fn write_command_read_frame_round_trip() {
    let mut channel = Vec::new();
    write_command(
        &mut channel,
        &Command::Put {
            key: b"key",
            value: b"v",
        },
    )
    .unwrap();

    let mut reader = io::Cursor::new(channel);
    let buf = read_frame(&mut reader).unwrap().unwrap();

    assert_eq!(
        decode_command(&buf).unwrap(),
        Command::Put {
            key: b"key",
            value: b"v"
        }
    );

    // Channel drained: next read is clean EOF
    assert!(read_frame(&mut reader).unwrap().is_none());
}

#[test]
fn read_frame_clean_eof_is_none() {
    let mut reader = io::Cursor::new(Vec::<u8>::new());
    assert!(read_frame(&mut reader).unwrap().is_none());
}

#[test]
fn read_frame_truncated_header_is_fatal() {
    let mut reader = io::Cursor::new(vec![0x00, 0x00]);
    let err = read_frame(&mut reader).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::ChannelIo);
}

#[test]
fn read_frame_truncated_payload_is_fatal() {
    let mut bytes = 100u32.to_be_bytes().to_vec();
    bytes.extend_from_slice(b"only a few bytes");

    let mut reader = io::Cursor::new(bytes);
    let err = read_frame(&mut reader).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::ChannelIo);
}

#[test]
fn read_frame_oversized_length_is_bad_command() {
    let mut reader = io::Cursor::new(u32::MAX.to_be_bytes().to_vec());
    let err = read_frame(&mut reader).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::BadCommand);
}

#[test]
fn write_reply_read_reply_round_trip() {
    let mut channel = Vec::new();
    write_reply(&mut channel, &Reply::ok(Some(b"stored".to_vec()))).unwrap();

    let mut reader = io::Cursor::new(channel);
    let reply = read_reply(&mut reader).unwrap();

    assert_eq!(reply.status, Status::Ok);
    assert_eq!(reply.payload.as_deref(), Some(&b"stored"[..]));
}
