//! Primitive codecs: null, boolean, int, long, float, double, bytes, string.
//!
//! Numeric encoders accept any numeric native that converts without loss of
//! range; union resolution decides which width reaches them.

use crate::config::DecodeLimits;
use crate::error::{DecodeError, EncodeError};
use crate::text::{self, StringMode};
use crate::value::Value;
use crate::wire;

pub(crate) fn mismatch(codec: &str, expected: &'static str, value: &Value) -> EncodeError {
    EncodeError::TypeMismatch {
        codec: codec.to_string(),
        expected,
        received: value.category(),
    }
}

fn to_i32(value: &Value) -> Result<i32, EncodeError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Long(l) => i32::try_from(*l).map_err(|_| EncodeError::OutOfRange {
            codec: "int".to_string(),
            value: l.to_string(),
        }),
        other => Err(mismatch("int", "int32 or int64", other)),
    }
}

fn to_i64(value: &Value) -> Result<i64, EncodeError> {
    match value {
        Value::Int(i) => Ok(i64::from(*i)),
        Value::Long(l) => Ok(*l),
        other => Err(mismatch("long", "int32 or int64", other)),
    }
}

fn to_f32(value: &Value) -> Result<f32, EncodeError> {
    match value {
        Value::Int(i) => Ok(*i as f32),
        Value::Long(l) => Ok(*l as f32),
        Value::Float(f) => Ok(*f),
        Value::Double(d) => Ok(*d as f32),
        other => Err(mismatch("float", "numeric", other)),
    }
}

fn to_f64(value: &Value) -> Result<f64, EncodeError> {
    match value {
        Value::Int(i) => Ok(f64::from(*i)),
        Value::Long(l) => Ok(*l as f64),
        Value::Float(f) => Ok(f64::from(*f)),
        Value::Double(d) => Ok(*d),
        other => Err(mismatch("double", "numeric", other)),
    }
}

fn to_bytes(value: &Value) -> Result<&[u8], EncodeError> {
    match value {
        Value::Bytes(b) => Ok(b),
        Value::String(s) => Ok(s.as_bytes()),
        other => Err(mismatch("bytes", "string or bytes", other)),
    }
}

/// `string` accepts bytes only when they are valid UTF-8.
fn to_utf8(value: &Value) -> Result<&str, EncodeError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bytes(b) => std::str::from_utf8(b).map_err(|_| mismatch("string", "UTF-8 text", value)),
        other => Err(mismatch("string", "string or bytes", other)),
    }
}

fn parse_token<T: std::str::FromStr>(input: &mut &[u8], codec: &str) -> Result<T, DecodeError> {
    let mut rest = *input;
    let token = text::read_number(&mut rest)?;
    let parsed = token
        .parse::<T>()
        .map_err(|_| DecodeError::invalid(format!("{}: cannot parse {:?}", codec, token)))?;
    *input = rest;
    Ok(parsed)
}

////////////////////////////////////////
// null
////////////////////////////////////////

pub(crate) fn null_encode(value: &Value) -> Result<(), EncodeError> {
    match value {
        Value::Null => Ok(()),
        other => Err(mismatch("null", "null", other)),
    }
}

pub(crate) fn null_text_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    null_encode(value)?;
    buf.extend_from_slice(b"null");
    Ok(())
}

pub(crate) fn null_text_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    text::expect_literal(input, "null")?;
    Ok(Value::Null)
}

////////////////////////////////////////
// boolean
////////////////////////////////////////

fn to_bool(value: &Value) -> Result<bool, EncodeError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        other => Err(mismatch("boolean", "boolean", other)),
    }
}

pub(crate) fn boolean_binary_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    buf.push(u8::from(to_bool(value)?));
    Ok(())
}

pub(crate) fn boolean_binary_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    let (&byte, rest) = input.split_first().ok_or(DecodeError::ShortBuffer)?;
    let value = match byte {
        0 => false,
        1 => true,
        other => return Err(DecodeError::invalid(format!("boolean: expected 0 or 1; found {}", other))),
    };
    *input = rest;
    Ok(Value::Boolean(value))
}

pub(crate) fn boolean_text_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    let literal: &[u8] = if to_bool(value)? { b"true" } else { b"false" };
    buf.extend_from_slice(literal);
    Ok(())
}

pub(crate) fn boolean_text_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    match text::peek(input) {
        Some(b't') => text::expect_literal(input, "true").map(|_| Value::Boolean(true)),
        Some(b'f') => text::expect_literal(input, "false").map(|_| Value::Boolean(false)),
        Some(other) => Err(DecodeError::invalid(format!("boolean: expected true or false; found {:?}", other as char))),
        None => Err(DecodeError::ShortBuffer),
    }
}

////////////////////////////////////////
// int / long
////////////////////////////////////////

pub(crate) fn int_binary_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    wire::write_long(buf, i64::from(to_i32(value)?));
    Ok(())
}

pub(crate) fn int_binary_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    wire::read_int(input).map(Value::Int)
}

pub(crate) fn int_text_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    buf.extend_from_slice(to_i32(value)?.to_string().as_bytes());
    Ok(())
}

pub(crate) fn int_text_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    parse_token::<i32>(input, "int").map(Value::Int)
}

pub(crate) fn long_binary_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    wire::write_long(buf, to_i64(value)?);
    Ok(())
}

pub(crate) fn long_binary_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    wire::read_long(input).map(Value::Long)
}

pub(crate) fn long_text_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    buf.extend_from_slice(to_i64(value)?.to_string().as_bytes());
    Ok(())
}

pub(crate) fn long_text_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    parse_token::<i64>(input, "long").map(Value::Long)
}

////////////////////////////////////////
// float / double
////////////////////////////////////////

pub(crate) fn float_binary_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    wire::write_float(buf, to_f32(value)?);
    Ok(())
}

pub(crate) fn float_binary_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    wire::read_float(input).map(Value::Float)
}

pub(crate) fn float_text_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    text::write_float(buf, to_f32(value)?);
    Ok(())
}

pub(crate) fn float_text_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    parse_token::<f32>(input, "float").map(Value::Float)
}

pub(crate) fn double_binary_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    wire::write_double(buf, to_f64(value)?);
    Ok(())
}

pub(crate) fn double_binary_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    wire::read_double(input).map(Value::Double)
}

pub(crate) fn double_text_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    text::write_double(buf, to_f64(value)?);
    Ok(())
}

pub(crate) fn double_text_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    parse_token::<f64>(input, "double").map(Value::Double)
}

////////////////////////////////////////
// bytes / string
////////////////////////////////////////

pub(crate) fn bytes_binary_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    let bytes = to_bytes(value)?;
    wire::write_long(buf, bytes.len() as i64);
    buf.extend_from_slice(bytes);
    Ok(())
}

fn read_length_prefixed<'a>(input: &mut &'a [u8], codec: &str, limits: &DecodeLimits) -> Result<&'a [u8], DecodeError> {
    let mut rest = *input;
    let len = wire::read_len(&mut rest, codec, limits.max_bytes_len)?;
    let bytes = wire::read_exact(&mut rest, len)?;
    *input = rest;
    Ok(bytes)
}

pub(crate) fn bytes_binary_decode(input: &mut &[u8], limits: &DecodeLimits) -> Result<Value, DecodeError> {
    read_length_prefixed(input, "bytes", limits).map(|b| Value::Bytes(b.to_vec()))
}

pub(crate) fn string_binary_decode(input: &mut &[u8], limits: &DecodeLimits) -> Result<Value, DecodeError> {
    let mut rest = *input;
    let bytes = read_length_prefixed(&mut rest, "string", limits)?;
    let s = std::str::from_utf8(bytes).map_err(|e| DecodeError::invalid(format!("string: {}", e)))?;
    *input = rest;
    Ok(Value::String(s.to_string()))
}

pub(crate) fn bytes_text_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    text::write_quoted(buf, to_bytes(value)?, StringMode::Bytes);
    Ok(())
}

pub(crate) fn bytes_text_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    text::read_quoted(input, StringMode::Bytes).map(Value::Bytes)
}

pub(crate) fn string_binary_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    let s = to_utf8(value)?;
    wire::write_long(buf, s.len() as i64);
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

pub(crate) fn string_text_encode(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    text::write_quoted(buf, to_utf8(value)?.as_bytes(), StringMode::Utf8);
    Ok(())
}

pub(crate) fn string_text_decode(input: &mut &[u8]) -> Result<Value, DecodeError> {
    text::read_string(input).map(Value::String)
}
