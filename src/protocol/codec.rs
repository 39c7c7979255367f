//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Frame Format (requests and responses)
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────────────────┐
//! │ Tag (1)  │ Len (4)  │ CRC (4)  │         Payload             │
//! └──────────┴──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! Tag is the request opcode, or `0x80` for responses. CRC is a crc32 over
//! the payload; a mismatch fails the frame as a protocol error.
//!
//! ### Request Payload by Opcode
//! - CREATE/OPEN/DROP_TABLE: name (u16 len + UTF-8 bytes)
//! - PING:   locator (u16 len + bytes) + nonce (8) + timeout_ns (8)
//! - READ:   table (4) + key (8) + reject rules (12) + max_len (4)
//! - WRITE:  table (4) + key (8) + reject rules (12) + value (u32 len + bytes)
//! - INSERT: table (4) + value (u32 len + bytes)
//! - REMOVE: table (4) + key (8) + reject rules (12)
//!
//! Values are raw length-prefixed bytes, never NUL-terminated; table names
//! carry a 16-bit length so long names survive intact.
//!
//! ### Response Payload
//! status (4) + version (8) + operation-specific body (rest of payload)

use std::io::{Read, Write};

use bytes::{Buf, BufMut};

use crate::error::{Result, StrataError};

use super::{Opcode, RejectRules, Request, Response};

/// Header size: 1 byte tag + 4 bytes length + 4 bytes CRC
pub const HEADER_SIZE: usize = 9;

/// Frame tag marking a response
pub const RESPONSE_TAG: u8 = 0x80;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request into a complete frame
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    let mut payload = Vec::new();

    match request {
        Request::CreateTable { name }
        | Request::OpenTable { name }
        | Request::DropTable { name } => {
            put_string(&mut payload, name)?;
        }
        Request::Ping {
            locator,
            nonce,
            timeout_ns,
        } => {
            put_string(&mut payload, locator)?;
            payload.put_u64(*nonce);
            payload.put_u64(*timeout_ns);
        }
        Request::Read {
            table,
            key,
            rules,
            max_len,
        } => {
            payload.put_u32(*table);
            payload.put_u64(*key);
            rules.encode_into(&mut payload);
            payload.put_u32(*max_len);
        }
        Request::Write {
            table,
            key,
            rules,
            value,
        } => {
            payload.put_u32(*table);
            payload.put_u64(*key);
            rules.encode_into(&mut payload);
            put_bytes(&mut payload, value)?;
        }
        Request::Insert { table, value } => {
            payload.put_u32(*table);
            put_bytes(&mut payload, value)?;
        }
        Request::Remove { table, key, rules } => {
            payload.put_u32(*table);
            payload.put_u64(*key);
            rules.encode_into(&mut payload);
        }
    }

    frame(request.opcode() as u8, payload)
}

/// Decode a request from a complete frame
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let (tag, payload) = split_frame(bytes)?;
    let mut buf = payload;

    let request = match tag {
        t if t == Opcode::CreateTable as u8 => Request::CreateTable {
            name: get_string(&mut buf)?,
        },
        t if t == Opcode::OpenTable as u8 => Request::OpenTable {
            name: get_string(&mut buf)?,
        },
        t if t == Opcode::DropTable as u8 => Request::DropTable {
            name: get_string(&mut buf)?,
        },
        t if t == Opcode::Ping as u8 => Request::Ping {
            locator: get_string(&mut buf)?,
            nonce: get_u64(&mut buf)?,
            timeout_ns: get_u64(&mut buf)?,
        },
        t if t == Opcode::Read as u8 => Request::Read {
            table: get_u32(&mut buf)?,
            key: get_u64(&mut buf)?,
            rules: RejectRules::decode(&mut buf)?,
            max_len: get_u32(&mut buf)?,
        },
        t if t == Opcode::Write as u8 => Request::Write {
            table: get_u32(&mut buf)?,
            key: get_u64(&mut buf)?,
            rules: RejectRules::decode(&mut buf)?,
            value: get_bytes(&mut buf)?,
        },
        t if t == Opcode::Insert as u8 => Request::Insert {
            table: get_u32(&mut buf)?,
            value: get_bytes(&mut buf)?,
        },
        t if t == Opcode::Remove as u8 => Request::Remove {
            table: get_u32(&mut buf)?,
            key: get_u64(&mut buf)?,
            rules: RejectRules::decode(&mut buf)?,
        },
        other => {
            return Err(StrataError::Protocol(format!(
                "unknown request opcode: 0x{:02x}",
                other
            )))
        }
    };

    if buf.has_remaining() {
        return Err(StrataError::Protocol(format!(
            "{} trailing bytes after request payload",
            buf.remaining()
        )));
    }

    Ok(request)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response into a complete frame
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(12 + response.body.len());
    payload.put_u32(response.status);
    payload.put_u64(response.version);
    payload.extend_from_slice(&response.body);

    frame(RESPONSE_TAG, payload)
}

/// Decode a response from a complete frame
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (tag, payload) = split_frame(bytes)?;
    if tag != RESPONSE_TAG {
        return Err(StrataError::Protocol(format!(
            "expected response frame, got tag 0x{:02x}",
            tag
        )));
    }

    let mut buf = payload;
    let status = get_u32(&mut buf)?;
    let version = get_u64(&mut buf)?;
    let body = buf.to_vec();

    Ok(Response {
        status,
        version,
        body,
    })
}

// =============================================================================
// Framing
// =============================================================================

/// Wrap a payload in a frame header
fn frame(tag: u8, payload: Vec<u8>) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(StrataError::Protocol(format!(
            "payload too large: {} bytes (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.put_u32(crc32fast::hash(&payload));
    message.extend_from_slice(&payload);

    Ok(message)
}

/// Split a frame into its tag and CRC-verified payload
fn split_frame(bytes: &[u8]) -> Result<(u8, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(StrataError::Protocol(format!(
            "incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = bytes;
    let tag = header.get_u8();
    let payload_len = header.get_u32() as usize;
    let crc = header.get_u32();

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(StrataError::Protocol(format!(
            "payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(StrataError::Protocol(format!(
            "incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let payload = &bytes[HEADER_SIZE..total_len];
    let actual_crc = crc32fast::hash(payload);
    if actual_crc != crc {
        return Err(StrataError::Protocol(format!(
            "frame checksum mismatch: header 0x{:08x}, payload 0x{:08x}",
            crc, actual_crc
        )));
    }

    Ok((tag, payload))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame from a stream
///
/// Blocks until the frame is received or an error occurs
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(StrataError::Protocol(format!(
            "payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

/// Read a complete request from a stream
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    decode_request(&read_frame(reader)?)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Field helpers
// =============================================================================

fn put_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    if s.len() > u16::MAX as usize {
        return Err(StrataError::Protocol(format!(
            "string too long for wire format: {} bytes",
            s.len()
        )));
    }
    buf.put_u16(s.len() as u16);
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn get_string(buf: &mut &[u8]) -> Result<String> {
    if buf.remaining() < 2 {
        return Err(StrataError::Protocol("truncated string length".to_string()));
    }
    let len = buf.get_u16() as usize;
    if buf.remaining() < len {
        return Err(StrataError::Protocol(format!(
            "truncated string: expected {} bytes, got {}",
            len,
            buf.remaining()
        )));
    }
    let mut raw = vec![0u8; len];
    buf.copy_to_slice(&mut raw);
    String::from_utf8(raw)
        .map_err(|e| StrataError::Protocol(format!("invalid UTF-8 in string: {}", e)))
}

fn put_bytes(buf: &mut Vec<u8>, value: &[u8]) -> Result<()> {
    if value.len() > u32::MAX as usize {
        return Err(StrataError::Protocol(format!(
            "value too long for wire format: {} bytes",
            value.len()
        )));
    }
    buf.put_u32(value.len() as u32);
    buf.extend_from_slice(value);
    Ok(())
}

fn get_bytes(buf: &mut &[u8]) -> Result<Vec<u8>> {
    if buf.remaining() < 4 {
        return Err(StrataError::Protocol("truncated value length".to_string()));
    }
    let len = buf.get_u32() as usize;
    if buf.remaining() < len {
        return Err(StrataError::Protocol(format!(
            "truncated value: expected {} bytes, got {}",
            len,
            buf.remaining()
        )));
    }
    let mut value = vec![0u8; len];
    buf.copy_to_slice(&mut value);
    Ok(value)
}

fn get_u32(buf: &mut &[u8]) -> Result<u32> {
    if buf.remaining() < 4 {
        return Err(StrataError::Protocol("truncated u32 field".to_string()));
    }
    Ok(buf.get_u32())
}

fn get_u64(buf: &mut &[u8]) -> Result<u64> {
    if buf.remaining() < 8 {
        return Err(StrataError::Protocol("truncated u64 field".to_string()));
    }
    Ok(buf.get_u64())
}
