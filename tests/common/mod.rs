//! Shared helpers for the codec integration tests

#![allow(dead_code)]

use schema_codec::{Codec, DecodeError, EncodeError, Value};

pub fn codec(schema: &str) -> Codec {
    Codec::new(schema).unwrap_or_else(|e| panic!("schema {}: {}", schema, e))
}

pub fn binary(schema: &str, value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    codec(schema)
        .binary_encode(&mut buf, value)
        .unwrap_or_else(|e| panic!("schema {}: value {:?}: {}", schema, value, e));
    buf
}

pub fn text(schema: &str, value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    codec(schema)
        .text_encode(&mut buf, value)
        .unwrap_or_else(|e| panic!("schema {}: value {:?}: {}", schema, value, e));
    buf
}

/// Encode must produce `expected`, and decoding it must give back `value` with nothing left.
pub fn binary_codec_pass(schema: &str, value: Value, expected: &[u8]) {
    assert_eq!(binary(schema, &value), expected, "schema {}: value {:?}", schema, value);

    let (decoded, rest) = codec(schema)
        .binary_decode(expected)
        .unwrap_or_else(|e| panic!("schema {}: {}", schema, e));
    assert!(rest.is_empty(), "schema {}: {} bytes left", schema, rest.len());
    assert_eq!(decoded, value, "schema {}", schema);
}

pub fn text_codec_pass(schema: &str, value: Value, expected: &[u8]) {
    assert_eq!(
        String::from_utf8_lossy(&text(schema, &value)),
        String::from_utf8_lossy(expected),
        "schema {}: value {:?}",
        schema,
        value
    );

    let (decoded, rest) = codec(schema)
        .text_decode(expected)
        .unwrap_or_else(|e| panic!("schema {}: {}", schema, e));
    assert!(rest.is_empty(), "schema {}: {} bytes left", schema, rest.len());
    assert_eq!(decoded, value, "schema {}", schema);
}

pub fn binary_encode_fail(schema: &str, value: Value) -> EncodeError {
    let mut buf = Vec::new();
    let err = codec(schema)
        .binary_encode(&mut buf, &value)
        .expect_err("encode should fail");
    assert!(buf.is_empty(), "failed encode left {:?}", buf);
    err
}

pub fn text_encode_fail(schema: &str, value: Value) -> EncodeError {
    let mut buf = Vec::new();
    let err = codec(schema).text_encode(&mut buf, &value).expect_err("encode should fail");
    assert!(buf.is_empty(), "failed encode left {:?}", buf);
    err
}

pub fn binary_decode_fail(schema: &str, buf: &[u8]) -> DecodeError {
    codec(schema).binary_decode(buf).expect_err("decode should fail")
}

pub fn text_decode_fail(schema: &str, buf: &[u8]) -> DecodeError {
    codec(schema).text_decode(buf).expect_err("decode should fail")
}
