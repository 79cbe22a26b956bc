//! Codec Tests
//!
//! Tests for request and response encoding/decoding.

use std::io::Cursor;

use donnydb::protocol::{
    decode_get_response, decode_request, decode_set_response, decode_value_len,
    encode_get, encode_request, encode_response, encode_set,
    read_request, write_request, write_response,
    Request, RequestType, Response, OK_RESPONSE,
};
use donnydb::DonnyError;

// =============================================================================
// Request Encoding Tests
// =============================================================================

#[test]
fn test_encode_set_layout() {
    let encoded = encode_set("ab", b"xyz").unwrap();

    let mut expected = b"SET".to_vec();
    expected.extend_from_slice(&2u64.to_le_bytes());
    expected.extend_from_slice(b"ab");
    expected.extend_from_slice(&3u64.to_le_bytes());
    expected.extend_from_slice(b"xyz");

    assert_eq!(&encoded[..], &expected[..]);
}

#[test]
fn test_encode_get_layout() {
    let encoded = encode_get("key").unwrap();

    assert_eq!(&encoded[..3], b"GET");
    assert_eq!(&encoded[3..11], &[3, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(&encoded[11..], b"key");
}

#[test]
fn test_encode_set_empty_value() {
    let encoded = encode_set("k", b"").unwrap();

    assert_eq!(encoded.len(), 3 + 8 + 1 + 8);
    assert_eq!(&encoded[12..], &0u64.to_le_bytes());
}

#[test]
fn test_encode_utf8_key_uses_byte_length() {
    let encoded = encode_get("ключ").unwrap();

    assert_eq!(&encoded[3..11], &8u64.to_le_bytes());
    assert_eq!(&encoded[11..], "ключ".as_bytes());
}

#[test]
fn test_encode_rejects_empty_key() {
    assert!(matches!(encode_get(""), Err(DonnyError::InvalidRequest(_))));
    assert!(matches!(encode_set("", b"v"), Err(DonnyError::InvalidRequest(_))));
}

#[test]
fn test_encode_request_dispatches_by_type() {
    let set = Request::Set {
        key: "k".to_string(),
        value: b"v".to_vec(),
    };
    let get = Request::Get {
        key: "k".to_string(),
    };

    assert_eq!(set.request_type(), RequestType::Set);
    assert_eq!(get.key(), "k");
    assert_eq!(encode_request(&set).unwrap(), encode_set("k", b"v").unwrap());
    assert_eq!(encode_request(&get).unwrap(), encode_get("k").unwrap());
}

// =============================================================================
// Request Decoding Tests
// =============================================================================

#[test]
fn test_decode_request_set() {
    let encoded = encode_set("mykey", b"myvalue").unwrap();
    let decoded = decode_request(&encoded, usize::MAX).unwrap();

    assert_eq!(
        decoded,
        Request::Set {
            key: "mykey".to_string(),
            value: b"myvalue".to_vec(),
        }
    );
}

#[test]
fn test_decode_request_unknown_tag() {
    let mut bytes = b"DEL".to_vec();
    bytes.extend_from_slice(&1u64.to_le_bytes());
    bytes.push(b'k');

    let result = decode_request(&bytes, usize::MAX);
    assert!(result.unwrap_err().to_string().contains("Unknown request tag"));
}

#[test]
fn test_decode_request_incomplete_key() {
    let mut bytes = b"GET".to_vec();
    bytes.extend_from_slice(&10u64.to_le_bytes());
    bytes.extend_from_slice(b"abc");

    let result = decode_request(&bytes, usize::MAX);
    assert!(result.unwrap_err().to_string().contains("Incomplete key"));
}

#[test]
fn test_decode_request_missing_value_length() {
    let mut bytes = b"SET".to_vec();
    bytes.extend_from_slice(&1u64.to_le_bytes());
    bytes.push(b'k');

    let result = decode_request(&bytes, usize::MAX);
    assert!(result.unwrap_err().to_string().contains("Missing value length"));
}

#[test]
fn test_decode_request_trailing_bytes() {
    let mut bytes = encode_get("k").unwrap().to_vec();
    bytes.push(0);

    let result = decode_request(&bytes, usize::MAX);
    assert!(result.unwrap_err().to_string().contains("trailing"));
}

#[test]
fn test_decode_request_rejects_invalid_utf8_key() {
    let mut bytes = b"GET".to_vec();
    bytes.extend_from_slice(&2u64.to_le_bytes());
    bytes.extend_from_slice(&[0xFF, 0xFE]);

    assert!(matches!(
        decode_request(&bytes, usize::MAX),
        Err(DonnyError::Protocol(_))
    ));
}

#[test]
fn test_decode_request_respects_max_len() {
    let encoded = encode_set("k", &[0u8; 64]).unwrap();

    let result = decode_request(&encoded, 16);
    assert!(result.unwrap_err().to_string().contains("too large"));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_encode_set_responses() {
    assert_eq!(&encode_response(&Response::set_ok()).unwrap()[..], b"OK\0");

    let failed = encode_response(&Response::set_failed()).unwrap();
    assert_eq!(failed.len(), 3);
    assert_ne!(&failed[..], &OK_RESPONSE[..]);
}

#[test]
fn test_decode_set_response() {
    assert!(decode_set_response(b"OK\0").unwrap());
    assert!(!decode_set_response(b"OK!").unwrap());
    assert!(!decode_set_response(b"ERR").unwrap());
    assert!(!decode_set_response(&[0, 0, 0]).unwrap());
}

#[test]
fn test_decode_set_response_wrong_size() {
    assert!(matches!(decode_set_response(b"OK"), Err(DonnyError::Protocol(_))));
    assert!(matches!(decode_set_response(b"OK\0\0"), Err(DonnyError::Protocol(_))));
}

#[test]
fn test_get_response_layout() {
    let encoded = encode_response(&Response::value(b"hello".to_vec())).unwrap();

    assert_eq!(&encoded[..8], &5u64.to_le_bytes());
    assert_eq!(&encoded[8..], b"hello");
    assert_eq!(decode_get_response(&encoded, usize::MAX).unwrap(), b"hello");
}

#[test]
fn test_get_response_zero_length() {
    let encoded = encode_response(&Response::value(Vec::new())).unwrap();

    assert_eq!(&encoded[..], &[0u8; 8]);
    assert!(decode_get_response(&encoded, usize::MAX).unwrap().is_empty());
}

#[test]
fn test_decode_get_response_incomplete() {
    let mut bytes = 10u64.to_le_bytes().to_vec();
    bytes.extend_from_slice(b"short");

    let result = decode_get_response(&bytes, usize::MAX);
    assert!(result.unwrap_err().to_string().contains("Incomplete value"));
}

#[test]
fn test_decode_value_len_limits() {
    assert_eq!(decode_value_len(42u64.to_le_bytes(), 100).unwrap(), 42);
    assert_eq!(decode_value_len(100u64.to_le_bytes(), 100).unwrap(), 100);

    let too_big = decode_value_len(101u64.to_le_bytes(), 100);
    assert!(too_big.unwrap_err().to_string().contains("Value too large"));

    assert!(matches!(
        decode_value_len(u64::MAX.to_le_bytes(), usize::MAX - 1),
        Err(DonnyError::Protocol(_))
    ));
}

// =============================================================================
// Stream Helper Tests
// =============================================================================

#[test]
fn test_write_then_read_requests_in_order() {
    let mut wire = Vec::new();
    let first = Request::Set {
        key: "a".to_string(),
        value: b"1".to_vec(),
    };
    let second = Request::Get {
        key: "a".to_string(),
    };
    write_request(&mut wire, &first).unwrap();
    write_request(&mut wire, &second).unwrap();

    let mut reader = Cursor::new(wire);
    assert_eq!(read_request(&mut reader, usize::MAX).unwrap(), first);
    assert_eq!(read_request(&mut reader, usize::MAX).unwrap(), second);

    match read_request(&mut reader, usize::MAX) {
        Err(DonnyError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected EOF, got {:?}", other),
    }
}

#[test]
fn test_read_request_rejects_unknown_tag() {
    let mut reader = Cursor::new(b"PUT".to_vec());

    let result = read_request(&mut reader, usize::MAX);
    assert!(matches!(result, Err(DonnyError::Protocol(_))));
}

#[test]
fn test_write_response_bytes() {
    let mut wire = Vec::new();
    write_response(&mut wire, &Response::set_ok()).unwrap();
    write_response(&mut wire, &Response::value(b"v".to_vec())).unwrap();

    let mut expected = b"OK\0".to_vec();
    expected.extend_from_slice(&1u64.to_le_bytes());
    expected.push(b'v');
    assert_eq!(wire, expected);
}
