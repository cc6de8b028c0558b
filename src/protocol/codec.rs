//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol, plus the
//! stream-based frame I/O helpers used by the worker loop and the
//! controlling client.
//!
//! Decoding is built on [`Cursor`], a pointer-plus-remaining-length view
//! into one command buffer. Every successful read advances the cursor by
//! exactly the bytes consumed; a failed read leaves it untouched. Decoded
//! byte-string arguments are zero-copy views into the buffer, which is safe
//! here because the engine is invoked synchronously within the same
//! dispatch call.

use std::io::{self, Read, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{FatalError, PortError, Result};
use super::{Command, Opcode, Reply, Status};

/// Maximum frame payload size (16 MB); larger frames are a fatal bad command
pub const MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Cursor
// =============================================================================

/// Incremental reader over one command buffer
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// True once every byte has been consumed.
    ///
    /// Handlers require this after decoding their declared arguments;
    /// leftover bytes are a fatal trailing-data violation.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Read a big-endian unsigned 32-bit integer.
    ///
    /// Returns `None` without moving the cursor if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Option<u32> {
        if self.buf.len() < 4 {
            return None;
        }
        let (head, rest) = self.buf.split_at(4);
        let value = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);
        self.buf = rest;
        Some(value)
    }

    /// Read a length-prefixed byte string as a view into the buffer.
    ///
    /// Returns `None` without moving the cursor if the length prefix cannot
    /// be read or fewer than `len` payload bytes remain.
    pub fn read_binary(&mut self) -> Option<&'a [u8]> {
        if self.buf.len() < 4 {
            return None;
        }
        let len = u32::from_be_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]]) as usize;
        if self.buf.len() - 4 < len {
            return None;
        }
        let bytes = &self.buf[4..4 + len];
        self.buf = &self.buf[4 + len..];
        Some(bytes)
    }
}

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to its wire payload (opcode + body, no outer frame)
pub fn encode_command(command: &Command<'_>) -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_u32(command.opcode() as u32);

    match command {
        Command::Close | Command::Flush => {}
        Command::Put { key, value } => {
            put_binary(&mut buf, key);
            put_binary(&mut buf, value);
        }
        Command::Get { key } | Command::Delete { key } => {
            put_binary(&mut buf, key);
        }
    }

    buf.to_vec()
}

fn put_binary(buf: &mut BytesMut, bytes: &[u8]) {
    buf.put_u32(bytes.len() as u32);
    buf.put_slice(bytes);
}

/// Decode one command buffer into a typed command.
///
/// Enforces the full strictness contract: a readable known opcode, the
/// opcode's exact argument shape, and zero bytes left over. Violations map
/// to the fatal condition the exit-status protocol documents for them.
pub fn decode_command(buf: &[u8]) -> std::result::Result<Command<'_>, FatalError> {
    let mut cursor = Cursor::new(buf);

    let opcode = cursor.read_u32().ok_or(FatalError::BadCommand)?;
    let opcode = Opcode::from_u32(opcode).ok_or(FatalError::BadCommand)?;

    let command = match opcode {
        Opcode::Close => Command::Close,
        Opcode::Flush => Command::Flush,
        Opcode::PutUserKv => {
            let key = cursor.read_binary().ok_or(FatalError::BadUserKey)?;
            let value = cursor.read_binary().ok_or(FatalError::BadUserValue)?;
            Command::Put { key, value }
        }
        Opcode::GetUserKv => {
            let key = cursor.read_binary().ok_or(FatalError::BadUserKey)?;
            Command::Get { key }
        }
        Opcode::DelUserKv => {
            let key = cursor.read_binary().ok_or(FatalError::BadUserKey)?;
            Command::Delete { key }
        }
    };

    // Exact consumption: over-sending clients indicate protocol drift
    if !cursor.is_empty() {
        return Err(FatalError::TrailingData);
    }

    Ok(command)
}

// =============================================================================
// Reply Encoding/Decoding
// =============================================================================

/// Encode a reply to a complete frame (length prefix included)
pub fn encode_reply(reply: &Reply) -> Vec<u8> {
    let payload = reply.payload.as_deref().unwrap_or(&[]);

    let mut buf = BytesMut::with_capacity(4 + 1 + payload.len());
    buf.put_u32(1 + payload.len() as u32);
    buf.put_u8(reply.status as u8);
    buf.put_slice(payload);

    buf.to_vec()
}

/// Decode a reply from a frame payload (length prefix already stripped)
pub fn decode_reply(bytes: &[u8]) -> Result<Reply> {
    let (status_byte, payload) = bytes
        .split_first()
        .ok_or_else(|| PortError::Protocol("empty reply frame".to_string()))?;

    let status = match status_byte {
        0 => Status::Ok,
        1 => Status::Error,
        other => {
            return Err(PortError::Protocol(format!(
                "unknown reply status: 0x{:02x}",
                other
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Reply { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one length-prefixed frame from the channel.
///
/// Returns `Ok(None)` on clean EOF at a frame boundary. EOF mid-frame,
/// read failures, and oversized frames are fatal.
pub fn read_frame<R: Read>(reader: &mut R) -> std::result::Result<Option<Vec<u8>>, FatalError> {
    let header = match read_header(reader)? {
        Some(header) => header,
        None => return Ok(None),
    };

    let len = u32::from_be_bytes(header);
    if len > MAX_FRAME_SIZE {
        return Err(FatalError::BadCommand);
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).map_err(FatalError::ChannelIo)?;

    Ok(Some(payload))
}

/// Read the 4-byte frame header, distinguishing clean EOF from truncation
fn read_header<R: Read>(reader: &mut R) -> io::Result<Option<[u8; 4]>> {
    let mut header = [0u8; 4];
    let mut filled = 0;

    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "truncated frame header",
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(Some(header))
}

/// Write one framed command to the channel (client side)
pub fn write_command<W: Write>(writer: &mut W, command: &Command<'_>) -> io::Result<()> {
    let payload = encode_command(command);

    let mut frame = BytesMut::with_capacity(4 + payload.len());
    frame.put_u32(payload.len() as u32);
    frame.put_slice(&payload);

    writer.write_all(&frame)?;
    writer.flush()
}

/// Write one framed reply to the channel (worker side)
pub fn write_reply<W: Write>(writer: &mut W, reply: &Reply) -> io::Result<()> {
    writer.write_all(&encode_reply(reply))?;
    writer.flush()
}

/// Read one framed reply from the channel (client side)
pub fn read_reply<R: Read>(reader: &mut R) -> Result<Reply> {
    let mut header = [0u8; 4];
    reader.read_exact(&mut header)?;

    let len = u32::from_be_bytes(header);
    if len > MAX_FRAME_SIZE {
        return Err(PortError::Protocol(format!(
            "reply frame too large: {} bytes (max {})",
            len, MAX_FRAME_SIZE
        )));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;

    decode_reply(&payload)
}
