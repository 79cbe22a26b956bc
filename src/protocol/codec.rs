//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol. Everything above
//! the stream helpers is pure: no I/O, no state.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────┬───────────────────────────┐
//! │ Tag (3)  │ Len (8)  │   Key   │ SET only: Len (8) + Value │
//! └──────────┴──────────┴─────────┴───────────────────────────┘
//! ```
//!
//! ### Response Format
//! - SET: 3 raw bytes, `"OK\0"` on success
//! - GET: Len (8) + Value

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{DonnyError, Result};
use super::{Request, RequestType, Response};

/// Size of the ASCII request tag
pub const TAG_SIZE: usize = 3;

/// Size of every length prefix
pub const LEN_SIZE: usize = 8;

/// Size of a SET response
pub const SET_RESPONSE_SIZE: usize = 3;

/// The only SET response that means success
pub const OK_RESPONSE: [u8; SET_RESPONSE_SIZE] = *b"OK\0";

/// SET failure marker written by `encode_response`; any non-OK value works
const FAILED_RESPONSE: [u8; SET_RESPONSE_SIZE] = *b"NO\0";

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a SET request
///
/// Format: "SET" + key_len (8) + key + value_len (8) + value
pub fn encode_set(key: &str, value: &[u8]) -> Result<Bytes> {
    validate_key(key)?;
    let key_len = encode_len(key.len(), "key")?;
    let value_len = encode_len(value.len(), "value")?;

    let mut buf = BytesMut::with_capacity(TAG_SIZE + 2 * LEN_SIZE + key.len() + value.len());
    buf.put_slice(RequestType::Set.tag());
    buf.put_u64_le(key_len);
    buf.put_slice(key.as_bytes());
    buf.put_u64_le(value_len);
    buf.put_slice(value);

    Ok(buf.freeze())
}

/// Encode a GET request
///
/// Format: "GET" + key_len (8) + key
pub fn encode_get(key: &str) -> Result<Bytes> {
    validate_key(key)?;
    let key_len = encode_len(key.len(), "key")?;

    let mut buf = BytesMut::with_capacity(TAG_SIZE + LEN_SIZE + key.len());
    buf.put_slice(RequestType::Get.tag());
    buf.put_u64_le(key_len);
    buf.put_slice(key.as_bytes());

    Ok(buf.freeze())
}

/// Encode any request
pub fn encode_request(request: &Request) -> Result<Bytes> {
    match request {
        Request::Get { key } => encode_get(key),
        Request::Set { key, value } => encode_set(key, value),
    }
}

/// Decode one complete request frame
///
/// The slice must contain exactly one frame; trailing bytes are an error.
pub fn decode_request(bytes: &[u8], max_len: usize) -> Result<Request> {
    let mut buf = bytes;

    if buf.remaining() < TAG_SIZE {
        return Err(DonnyError::Protocol(format!(
            "Incomplete request tag: expected {} bytes, got {}",
            TAG_SIZE,
            buf.remaining()
        )));
    }
    let request_type = parse_tag(&buf[..TAG_SIZE])?;
    buf.advance(TAG_SIZE);

    let key = take_chunk(&mut buf, max_len, "key")?;
    let key = parse_key(key)?;

    let request = match request_type {
        RequestType::Get => Request::Get { key },
        RequestType::Set => {
            let value = take_chunk(&mut buf, max_len, "value")?;
            Request::Set { key, value }
        }
    };

    if buf.has_remaining() {
        return Err(DonnyError::Protocol(format!(
            "{} trailing bytes after request",
            buf.remaining()
        )));
    }

    Ok(request)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Result<Bytes> {
    match response {
        Response::SetResult { ok } => {
            let marker = if *ok { OK_RESPONSE } else { FAILED_RESPONSE };
            Ok(Bytes::copy_from_slice(&marker))
        }
        Response::GetResult(value) => {
            let len = encode_len(value.len(), "value")?;
            let mut buf = BytesMut::with_capacity(LEN_SIZE + value.len());
            buf.put_u64_le(len);
            buf.put_slice(value);
            Ok(buf.freeze())
        }
    }
}

/// Decode a SET response
///
/// Exactly 3 bytes are expected. Success iff they equal `"OK\0"`; every
/// other 3-byte value is a failed SET, not a protocol error.
pub fn decode_set_response(bytes: &[u8]) -> Result<bool> {
    if bytes.len() != SET_RESPONSE_SIZE {
        return Err(DonnyError::Protocol(format!(
            "SET response must be {} bytes, got {}",
            SET_RESPONSE_SIZE,
            bytes.len()
        )));
    }
    Ok(bytes == OK_RESPONSE)
}

/// Decode a GET length prefix
///
/// Fails if the length does not fit in memory or exceeds `max_len`.
pub fn decode_value_len(prefix: [u8; LEN_SIZE], max_len: usize) -> Result<usize> {
    let raw = u64::from_le_bytes(prefix);
    let len = usize::try_from(raw).map_err(|_| {
        DonnyError::Protocol(format!("Value length {} does not fit in memory", raw))
    })?;

    if len > max_len {
        return Err(DonnyError::Protocol(format!(
            "Value too large: {} bytes (max {})",
            len, max_len
        )));
    }

    Ok(len)
}

/// Decode one complete GET response frame
pub fn decode_get_response(bytes: &[u8], max_len: usize) -> Result<Vec<u8>> {
    let mut buf = bytes;
    let value = take_chunk(&mut buf, max_len, "value")?;

    if buf.has_remaining() {
        return Err(DonnyError::Protocol(format!(
            "{} trailing bytes after GET response",
            buf.remaining()
        )));
    }

    Ok(value)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request from a stream
///
/// Blocks until a complete request is received or an error occurs. A clean
/// disconnect before the tag surfaces as an `UnexpectedEof` I/O error.
pub fn read_request<R: Read>(reader: &mut R, max_len: usize) -> Result<Request> {
    let mut tag = [0u8; TAG_SIZE];
    reader.read_exact(&mut tag)?;
    let request_type = parse_tag(&tag)?;

    let key = parse_key(read_chunk(reader, max_len, "key")?)?;

    match request_type {
        RequestType::Get => Ok(Request::Get { key }),
        RequestType::Set => {
            let value = read_chunk(reader, max_len, "value")?;
            Ok(Request::Set { key, value })
        }
    }
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(DonnyError::InvalidRequest("key must not be empty".to_string()));
    }
    Ok(())
}

fn encode_len(len: usize, what: &str) -> Result<u64> {
    u64::try_from(len).map_err(|_| {
        DonnyError::InvalidRequest(format!("{} length {} does not fit the length field", what, len))
    })
}

fn parse_tag(tag: &[u8]) -> Result<RequestType> {
    RequestType::from_tag(tag).ok_or_else(|| {
        DonnyError::Protocol(format!("Unknown request tag: {:02x?}", tag))
    })
}

fn parse_key(bytes: Vec<u8>) -> Result<String> {
    let key = String::from_utf8(bytes)
        .map_err(|e| DonnyError::Protocol(format!("Key is not valid UTF-8: {}", e)))?;
    if key.is_empty() {
        return Err(DonnyError::Protocol("Empty key".to_string()));
    }
    Ok(key)
}

fn check_len(raw: u64, max_len: usize, what: &str) -> Result<usize> {
    match usize::try_from(raw) {
        Ok(len) if len <= max_len => Ok(len),
        _ => Err(DonnyError::Protocol(format!(
            "{} too large: {} bytes (max {})",
            what, raw, max_len
        ))),
    }
}

/// Take a length-prefixed chunk off the front of `buf`
fn take_chunk(buf: &mut &[u8], max_len: usize, what: &str) -> Result<Vec<u8>> {
    if buf.remaining() < LEN_SIZE {
        return Err(DonnyError::Protocol(format!(
            "Missing {} length: expected {} bytes, got {}",
            what,
            LEN_SIZE,
            buf.remaining()
        )));
    }
    let len = check_len(buf.get_u64_le(), max_len, what)?;

    if buf.remaining() < len {
        return Err(DonnyError::Protocol(format!(
            "Incomplete {}: expected {} bytes, got {}",
            what,
            len,
            buf.remaining()
        )));
    }

    let chunk = buf[..len].to_vec();
    buf.advance(len);
    Ok(chunk)
}

/// Read a length-prefixed chunk from a stream
fn read_chunk<R: Read>(reader: &mut R, max_len: usize, what: &str) -> Result<Vec<u8>> {
    let mut prefix = [0u8; LEN_SIZE];
    reader.read_exact(&mut prefix)?;
    let len = check_len(u64::from_le_bytes(prefix), max_len, what)?;

    let mut chunk = vec![0u8; len];
    if len > 0 {
        reader.read_exact(&mut chunk)?;
    }
    Ok(chunk)
}
