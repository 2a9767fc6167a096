//! Binary and text behavior of the primitive codecs

mod common;

use common::*;
use schema_codec::{Codec, CodecConfig, DecodeError, DecodeLimits, EncodeError, Value};

#[test]
fn test_null() {
    binary_codec_pass("null", Value::Null, b"");
    text_codec_pass("null", Value::Null, b"null");
    assert!(matches!(binary_encode_fail("null", Value::Int(0)), EncodeError::TypeMismatch { .. }));
}

#[test]
fn test_boolean() {
    binary_codec_pass("boolean", Value::Boolean(false), b"\x00");
    binary_codec_pass("boolean", Value::Boolean(true), b"\x01");
    text_codec_pass("boolean", Value::Boolean(true), b"true");
    text_codec_pass("boolean", Value::Boolean(false), b"false");

    assert!(matches!(binary_decode_fail("boolean", b""), DecodeError::ShortBuffer));
    assert!(matches!(binary_decode_fail("boolean", b"\x02"), DecodeError::InvalidEncoding(_)));
    assert!(matches!(text_decode_fail("boolean", b"tru"), DecodeError::ShortBuffer));
}

#[test]
fn test_int() {
    binary_codec_pass("int", Value::Int(0), b"\x00");
    binary_codec_pass("int", Value::Int(-1), b"\x01");
    binary_codec_pass("int", Value::Int(3), b"\x06");
    binary_codec_pass("int", Value::Int(-64), b"\x7f");
    binary_codec_pass("int", Value::Int(64), b"\x80\x01");
    binary_codec_pass("int", Value::Int(i32::MIN), b"\xff\xff\xff\xff\x0f");

    // int64 natives narrow when they fit
    assert_eq!(binary("int", &Value::Long(3)), b"\x06");
    assert!(matches!(
        binary_encode_fail("int", Value::Long(i64::from(i32::MAX) + 1)),
        EncodeError::OutOfRange { .. }
    ));
    assert!(matches!(binary_encode_fail("int", Value::Double(3.0)), EncodeError::TypeMismatch { .. }));

    // a long-sized varint does not fit an int
    assert!(matches!(
        binary_decode_fail("int", b"\xff\xff\xff\xff\x1f"),
        DecodeError::InvalidEncoding(_)
    ));
    assert!(matches!(binary_decode_fail("int", b"\x80"), DecodeError::ShortBuffer));

    text_codec_pass("int", Value::Int(-42), b"-42");
}

#[test]
fn test_long() {
    binary_codec_pass("long", Value::Long(3), b"\x06");
    binary_codec_pass("long", Value::Long(i64::MIN), b"\xff\xff\xff\xff\xff\xff\xff\xff\xff\x01");
    assert_eq!(binary("long", &Value::Int(3)), b"\x06");

    // more than ten bytes of continuation
    assert!(matches!(
        binary_decode_fail("long", b"\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff\x01"),
        DecodeError::InvalidEncoding(_)
    ));

    text_codec_pass("long", Value::Long(9_000_000_000), b"9000000000");
}

#[test]
fn test_float_and_double() {
    binary_codec_pass("float", Value::Float(3.5), b"\x00\x00\x60\x40");
    binary_codec_pass("double", Value::Double(3.5), b"\x00\x00\x00\x00\x00\x00\x0c\x40");
    assert_eq!(binary("double", &Value::Float(3.5)), b"\x00\x00\x00\x00\x00\x00\x0c\x40");
    assert_eq!(binary("float", &Value::Int(1)), b"\x00\x00\x80\x3f");

    assert!(matches!(binary_decode_fail("float", b"\x00\x00\x60"), DecodeError::ShortBuffer));
    assert!(matches!(binary_decode_fail("double", b"\x00"), DecodeError::ShortBuffer));

    text_codec_pass("float", Value::Float(3.5), b"3.5");
    text_codec_pass("double", Value::Double(-0.25), b"-0.25");
}

#[test]
fn test_non_finite_text_tokens() {
    text_codec_pass("double", Value::Double(f64::INFINITY), b"Infinity");
    text_codec_pass("double", Value::Double(f64::NEG_INFINITY), b"-Infinity");
    assert_eq!(text("float", &Value::Float(f32::NAN)), b"NaN");

    let (decoded, _) = codec("double").text_decode(b"NaN").unwrap();
    assert!(matches!(decoded, Value::Double(d) if d.is_nan()));
}

#[test]
fn test_bytes_binary() {
    binary_codec_pass("bytes", Value::Bytes(Vec::new()), b"\x00");
    binary_codec_pass("bytes", Value::Bytes(b"some bytes".to_vec()), b"\x14some bytes");
    assert_eq!(binary("bytes", &Value::from("some bytes")), b"\x14some bytes");

    assert!(matches!(binary_encode_fail("bytes", Value::Int(42)), EncodeError::TypeMismatch { .. }));
    assert!(matches!(binary_decode_fail("bytes", b""), DecodeError::ShortBuffer));
    assert!(matches!(binary_decode_fail("bytes", b"\x02"), DecodeError::ShortBuffer));
    assert!(matches!(binary_decode_fail("bytes", b"\x01"), DecodeError::InvalidEncoding(_)));
}

#[test]
fn test_string_binary() {
    binary_codec_pass("string", Value::from(""), b"\x00");
    binary_codec_pass("string", Value::from("some string"), b"\x16some string");
    assert_eq!(binary("string", &Value::Bytes(b"ab".to_vec())), b"\x04ab");
    assert!(matches!(
        binary_encode_fail("string", Value::Bytes(vec![0xff])),
        EncodeError::TypeMismatch { expected: "UTF-8 text", .. }
    ));

    assert!(matches!(binary_decode_fail("string", b"\x02"), DecodeError::ShortBuffer));
    assert!(matches!(binary_decode_fail("string", b"\x02\xff"), DecodeError::InvalidEncoding(_)));
}

#[test]
fn test_decode_leaves_trailing_bytes() {
    let (value, rest) = codec("string").binary_decode(b"\x04abXYZ").unwrap();
    assert_eq!(value, Value::from("ab"));
    assert_eq!(rest, b"XYZ");

    let (value, rest) = codec("int").text_decode(b" 17 ,next").unwrap();
    assert_eq!(value, Value::Int(17));
    assert_eq!(rest, b" ,next");
}

#[test]
fn test_bytes_length_limit() {
    let config = CodecConfig {
        limits: DecodeLimits {
            max_bytes_len: 4,
            ..DecodeLimits::default()
        },
    };
    let codec = Codec::with_config("bytes", config).unwrap();

    assert!(codec.binary_decode(b"\x08abcd").is_ok());
    assert!(matches!(codec.binary_decode(b"\x0aabcde"), Err(DecodeError::InvalidEncoding(_))));
    // limit is checked before the payload is read
    assert!(matches!(codec.binary_decode(b"\xfe\xff\xff\xff\x0f"), Err(DecodeError::InvalidEncoding(_))));
}

#[test]
fn test_failed_encode_keeps_prefix() {
    let codec = codec("int");
    let mut buf = b"prefix".to_vec();
    assert!(codec.binary_encode(&mut buf, &Value::from("three")).is_err());
    assert_eq!(buf, b"prefix");

    codec.binary_encode(&mut buf, &Value::Int(3)).unwrap();
    assert_eq!(buf, b"prefix\x06");
}
