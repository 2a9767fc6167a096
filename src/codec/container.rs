//! Array, map, and record codecs, plus the enum and fixed named types.
//!
//! Arrays and maps are written as one positive-count block followed by a
//! zero block. Readers accept any number of blocks, including negative-count
//! blocks that carry a byte size.

use std::collections::BTreeMap;

use super::primitive::{self, mismatch};
use super::Tree;
use crate::config::DecodeLimits;
use crate::error::{DecodeError, EncodeError};
use crate::name::Name;
use crate::schema::{Field, NodeId};
use crate::text::{self, StringMode};
use crate::value::Value;
use crate::wire;

/// Read a block header, returning the item count; zero ends the sequence.
fn read_block_count(input: &mut &[u8], codec: &str, limits: &DecodeLimits) -> Result<usize, DecodeError> {
    let count = wire::read_long(input)?;
    let count = if count < 0 {
        let size = wire::read_long(input)?;
        if size < 0 {
            return Err(DecodeError::invalid(format!("{}: negative block size: {}", codec, size)));
        }
        if size as u64 > limits.max_block_size {
            return Err(DecodeError::invalid(format!(
                "{}: block size {} exceeds limit {}",
                codec, size, limits.max_block_size
            )));
        }
        count.checked_neg().ok_or_else(|| DecodeError::invalid(format!("{}: block count overflow", codec)))?
    } else {
        count
    };
    if count as u64 > limits.max_block_count {
        return Err(DecodeError::invalid(format!(
            "{}: block count {} exceeds limit {}",
            codec, count, limits.max_block_count
        )));
    }
    usize::try_from(count).map_err(|_| DecodeError::invalid(format!("{}: block count {} too large", codec, count)))
}

/// Items never take less than zero bytes, so cap preallocation by what is left.
fn capacity_hint(count: usize, input: &[u8]) -> usize {
    count.min(input.len())
}

/// Consume `,` or the closing byte after a text element; true when closed.
fn text_separator(input: &mut &[u8], close: u8) -> Result<bool, DecodeError> {
    match text::peek(input) {
        Some(b',') => text::expect(input, b',').map(|_| false),
        Some(b) if b == close => text::expect(input, close).map(|_| true),
        Some(b) => Err(DecodeError::invalid(format!(
            "expected ',' or {:?}; found {:?}",
            close as char, b as char
        ))),
        None => Err(DecodeError::ShortBuffer),
    }
}

/// Consume the opening byte; true when the container is immediately closed.
fn text_open(input: &mut &[u8], open: u8, close: u8) -> Result<bool, DecodeError> {
    text::expect(input, open)?;
    if text::peek(input) == Some(close) {
        text::expect(input, close)?;
        return Ok(true);
    }
    Ok(false)
}

impl Tree {
    ////////////////////////////////////////
    // array
    ////////////////////////////////////////

    pub(crate) fn array_binary_encode(&self, items: NodeId, buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
        let Value::Array(elements) = value else {
            return Err(mismatch("array", "array", value));
        };
        if !elements.is_empty() {
            wire::write_long(buf, elements.len() as i64);
            for element in elements {
                self.encode_binary(items, buf, element)?;
            }
        }
        wire::write_long(buf, 0);
        Ok(())
    }

    pub(crate) fn array_binary_decode(&self, items: NodeId, input: &mut &[u8], depth: usize) -> Result<Value, DecodeError> {
        let mut elements = Vec::new();
        loop {
            let count = read_block_count(input, "array", &self.limits)?;
            if count == 0 {
                return Ok(Value::Array(elements));
            }
            elements.reserve(capacity_hint(count, input));
            for _ in 0..count {
                elements.push(self.decode_binary(items, input, depth + 1)?);
            }
        }
    }

    pub(crate) fn array_text_encode(&self, items: NodeId, buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
        let Value::Array(elements) = value else {
            return Err(mismatch("array", "array", value));
        };
        buf.push(b'[');
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            self.encode_text(items, buf, element)?;
        }
        buf.push(b']');
        Ok(())
    }

    pub(crate) fn array_text_decode(&self, items: NodeId, input: &mut &[u8], depth: usize) -> Result<Value, DecodeError> {
        let mut elements = Vec::new();
        if text_open(input, b'[', b']')? {
            return Ok(Value::Array(elements));
        }
        loop {
            elements.push(self.decode_text(items, input, depth + 1)?);
            if text_separator(input, b']')? {
                return Ok(Value::Array(elements));
            }
        }
    }

    ////////////////////////////////////////
    // map
    ////////////////////////////////////////

    pub(crate) fn map_binary_encode(&self, values: NodeId, buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
        let Value::Map(entries) = value else {
            return Err(mismatch("map", "map", value));
        };
        if !entries.is_empty() {
            wire::write_long(buf, entries.len() as i64);
            for (key, entry) in entries {
                wire::write_long(buf, key.len() as i64);
                buf.extend_from_slice(key.as_bytes());
                self.encode_binary(values, buf, entry)?;
            }
        }
        wire::write_long(buf, 0);
        Ok(())
    }

    pub(crate) fn map_binary_decode(&self, values: NodeId, input: &mut &[u8], depth: usize) -> Result<Value, DecodeError> {
        let mut entries = BTreeMap::new();
        loop {
            let count = read_block_count(input, "map", &self.limits)?;
            if count == 0 {
                return Ok(Value::Map(entries));
            }
            for _ in 0..count {
                let key = match primitive::string_binary_decode(input, &self.limits)? {
                    Value::String(key) => key,
                    _ => return Err(DecodeError::invalid("map: key is not a string")),
                };
                let entry = self.decode_binary(values, input, depth + 1)?;
                entries.insert(key, entry);
            }
        }
    }

    pub(crate) fn map_text_encode(&self, values: NodeId, buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
        let Value::Map(entries) = value else {
            return Err(mismatch("map", "map", value));
        };
        buf.push(b'{');
        for (i, (key, entry)) in entries.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            text::write_quoted(buf, key.as_bytes(), StringMode::Utf8);
            buf.push(b':');
            self.encode_text(values, buf, entry)?;
        }
        buf.push(b'}');
        Ok(())
    }

    pub(crate) fn map_text_decode(&self, values: NodeId, input: &mut &[u8], depth: usize) -> Result<Value, DecodeError> {
        let mut entries = BTreeMap::new();
        if text_open(input, b'{', b'}')? {
            return Ok(Value::Map(entries));
        }
        loop {
            let key = text::read_string(input)?;
            text::expect(input, b':')?;
            let entry = self.decode_text(values, input, depth + 1)?;
            entries.insert(key, entry);
            if text_separator(input, b'}')? {
                return Ok(Value::Map(entries));
            }
        }
    }

    ////////////////////////////////////////
    // record
    ////////////////////////////////////////

    /// Field value from the native input, falling back to its default.
    fn field_value<'v>(
        name: &Name,
        field: &'v Field,
        entries: &'v BTreeMap<String, Value>,
    ) -> Result<&'v Value, EncodeError> {
        entries
            .get(&field.name)
            .or(field.default.as_ref())
            .ok_or_else(|| EncodeError::MissingField {
                codec: name.to_string(),
                field: field.name.clone(),
            })
    }

    pub(crate) fn record_binary_encode(
        &self,
        name: &Name,
        fields: &[Field],
        buf: &mut Vec<u8>,
        value: &Value,
    ) -> Result<(), EncodeError> {
        let Value::Map(entries) = value else {
            return Err(mismatch(name.full_name(), "map", value));
        };
        for field in fields {
            let field_value = Self::field_value(name, field, entries)?;
            self.encode_binary(field.schema, buf, field_value)?;
        }
        Ok(())
    }

    pub(crate) fn record_binary_decode(&self, fields: &[Field], input: &mut &[u8], depth: usize) -> Result<Value, DecodeError> {
        let mut record = BTreeMap::new();
        for field in fields {
            let value = self.decode_binary(field.schema, input, depth + 1)?;
            record.insert(field.name.clone(), value);
        }
        Ok(Value::Map(record))
    }

    pub(crate) fn record_text_encode(
        &self,
        name: &Name,
        fields: &[Field],
        buf: &mut Vec<u8>,
        value: &Value,
    ) -> Result<(), EncodeError> {
        let Value::Map(entries) = value else {
            return Err(mismatch(name.full_name(), "map", value));
        };
        buf.push(b'{');
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            let field_value = Self::field_value(name, field, entries)?;
            text::write_quoted(buf, field.name.as_bytes(), StringMode::Utf8);
            buf.push(b':');
            self.encode_text(field.schema, buf, field_value)?;
        }
        buf.push(b'}');
        Ok(())
    }

    pub(crate) fn record_text_decode(
        &self,
        name: &Name,
        fields: &[Field],
        input: &mut &[u8],
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let mut record = BTreeMap::new();
        if !text_open(input, b'{', b'}')? {
            loop {
                let key = text::read_string(input)?;
                let field = fields
                    .iter()
                    .find(|f| f.name == key)
                    .ok_or_else(|| DecodeError::invalid(format!("{}: unknown field {:?}", name, key)))?;
                if record.contains_key(&key) {
                    return Err(DecodeError::invalid(format!("{}: duplicate field {:?}", name, key)));
                }
                text::expect(input, b':')?;
                let value = self.decode_text(field.schema, input, depth + 1)?;
                record.insert(key, value);
                if text_separator(input, b'}')? {
                    break;
                }
            }
        }
        for field in fields {
            if record.contains_key(&field.name) {
                continue;
            }
            let default = field
                .default
                .clone()
                .ok_or_else(|| DecodeError::invalid(format!("{}: missing field {:?}", name, field.name)))?;
            record.insert(field.name.clone(), default.into_decoded());
        }
        Ok(Value::Map(record))
    }
}

////////////////////////////////////////
// enum
////////////////////////////////////////

fn symbol_index(value: &Value, name: &Name, symbols: &[String]) -> Result<usize, EncodeError> {
    let Value::String(symbol) = value else {
        return Err(mismatch(name.full_name(), "string", value));
    };
    symbols
        .iter()
        .position(|s| s == symbol)
        .ok_or_else(|| EncodeError::UnknownSymbol {
            codec: name.to_string(),
            symbol: symbol.clone(),
        })
}

pub(crate) fn enum_binary_encode(buf: &mut Vec<u8>, value: &Value, name: &Name, symbols: &[String]) -> Result<(), EncodeError> {
    let index = symbol_index(value, name, symbols)?;
    wire::write_long(buf, index as i64);
    Ok(())
}

pub(crate) fn enum_binary_decode(input: &mut &[u8], name: &Name, symbols: &[String]) -> Result<Value, DecodeError> {
    let mut rest = *input;
    let index = wire::read_long(&mut rest)?;
    let symbol = usize::try_from(index)
        .ok()
        .and_then(|i| symbols.get(i))
        .ok_or_else(|| DecodeError::invalid(format!("{}: symbol index out of range: {}", name, index)))?;
    *input = rest;
    Ok(Value::String(symbol.clone()))
}

pub(crate) fn enum_text_encode(buf: &mut Vec<u8>, value: &Value, name: &Name, symbols: &[String]) -> Result<(), EncodeError> {
    let index = symbol_index(value, name, symbols)?;
    text::write_quoted(buf, symbols[index].as_bytes(), StringMode::Utf8);
    Ok(())
}

pub(crate) fn enum_text_decode(input: &mut &[u8], name: &Name, symbols: &[String]) -> Result<Value, DecodeError> {
    let mut rest = *input;
    let symbol = text::read_string(&mut rest)?;
    if !symbols.contains(&symbol) {
        return Err(DecodeError::invalid(format!("{}: unknown symbol {:?}", name, symbol)));
    }
    *input = rest;
    Ok(Value::String(symbol))
}

////////////////////////////////////////
// fixed
////////////////////////////////////////

fn fixed_bytes<'v>(value: &'v Value, name: &Name, size: usize) -> Result<&'v [u8], EncodeError> {
    let bytes = match value {
        Value::Bytes(b) => b.as_slice(),
        Value::String(s) => s.as_bytes(),
        other => return Err(mismatch(name.full_name(), "string or bytes", other)),
    };
    if bytes.len() != size {
        return Err(EncodeError::FixedSize {
            codec: name.to_string(),
            expected: size,
            received: bytes.len(),
        });
    }
    Ok(bytes)
}

pub(crate) fn fixed_binary_encode(buf: &mut Vec<u8>, value: &Value, name: &Name, size: usize) -> Result<(), EncodeError> {
    buf.extend_from_slice(fixed_bytes(value, name, size)?);
    Ok(())
}

pub(crate) fn fixed_binary_decode(input: &mut &[u8], size: usize) -> Result<Value, DecodeError> {
    wire::read_exact(input, size).map(|b| Value::Bytes(b.to_vec()))
}

pub(crate) fn fixed_text_encode(buf: &mut Vec<u8>, value: &Value, name: &Name, size: usize) -> Result<(), EncodeError> {
    text::write_quoted(buf, fixed_bytes(value, name, size)?, StringMode::Bytes);
    Ok(())
}

pub(crate) fn fixed_text_decode(input: &mut &[u8], name: &Name, size: usize) -> Result<Value, DecodeError> {
    let mut rest = *input;
    let bytes = text::read_quoted(&mut rest, StringMode::Bytes)?;
    if bytes.len() != size {
        return Err(DecodeError::invalid(format!(
            "{}: expected {} bytes; found {}",
            name,
            size,
            bytes.len()
        )));
    }
    *input = rest;
    Ok(Value::Bytes(bytes))
}
