//! Compiled codecs
//!
//! A [`Codec`] owns the node arena produced by the compiler and walks it to
//! encode and decode. The arena is immutable and shared through an `Arc`, so
//! a codec can be cloned and used from any number of threads at once.

pub(crate) mod container;
pub(crate) mod primitive;
pub(crate) mod union;

use std::fmt;
use std::sync::Arc;

use crate::compiler;
use crate::config::{CodecConfig, DecodeLimits};
use crate::error::{DecodeError, EncodeError, Result};
use crate::schema::{NodeId, Schema};
use crate::value::Value;

/// A compiled schema with binary and text encoders and decoders
#[derive(Clone)]
pub struct Codec {
    inner: Arc<Inner>,
}

struct Inner {
    text: String,
    tree: Tree,
    root: NodeId,
}

/// Node arena plus the decode limits every walk consults
pub(crate) struct Tree {
    nodes: Vec<Schema>,
    limits: DecodeLimits,
}

impl Codec {
    /// Compile schema text with default limits
    pub fn new(schema: &str) -> Result<Self> {
        Self::with_config(schema, CodecConfig::default())
    }

    /// Compile schema text with explicit configuration
    pub fn with_config(schema: &str, config: CodecConfig) -> Result<Self> {
        let compiled = compiler::compile(schema)?;
        Ok(Self {
            inner: Arc::new(Inner {
                text: schema.to_string(),
                tree: Tree {
                    nodes: compiled.nodes,
                    limits: config.limits,
                },
                root: compiled.root,
            }),
        })
    }

    /// The schema text this codec was compiled from
    pub fn schema(&self) -> &str {
        &self.inner.text
    }

    /// The root schema node
    pub fn root(&self) -> &Schema {
        self.inner.tree.node(self.inner.root)
    }

    /// Type name of the root: a primitive keyword, `array`, `map`, `union`, or a full name
    pub fn type_name(&self) -> &str {
        self.root().type_name()
    }

    /// Look up any node of the compiled arena
    pub fn node(&self, id: NodeId) -> &Schema {
        self.inner.tree.node(id)
    }

    /// Append the binary encoding of `value` to `buf`.
    ///
    /// On error `buf` is restored to its length at entry.
    pub fn binary_encode(&self, buf: &mut Vec<u8>, value: &Value) -> std::result::Result<(), EncodeError> {
        let start = buf.len();
        let result = self.inner.tree.encode_binary(self.inner.root, buf, value);
        if result.is_err() {
            buf.truncate(start);
        }
        result
    }

    /// Decode one value from the front of `buf`, returning it with the unread remainder.
    pub fn binary_decode<'a>(&self, buf: &'a [u8]) -> std::result::Result<(Value, &'a [u8]), DecodeError> {
        let mut rest = buf;
        let value = self.inner.tree.decode_binary(self.inner.root, &mut rest, 0)?;
        Ok((value, rest))
    }

    /// Append the text (JSON) encoding of `value` to `buf`.
    ///
    /// On error `buf` is restored to its length at entry.
    pub fn text_encode(&self, buf: &mut Vec<u8>, value: &Value) -> std::result::Result<(), EncodeError> {
        let start = buf.len();
        let result = self.inner.tree.encode_text(self.inner.root, buf, value);
        if result.is_err() {
            buf.truncate(start);
        }
        result
    }

    /// Decode one text-encoded value from the front of `buf`.
    pub fn text_decode<'a>(&self, buf: &'a [u8]) -> std::result::Result<(Value, &'a [u8]), DecodeError> {
        let mut rest = buf;
        let value = self.inner.tree.decode_text(self.inner.root, &mut rest, 0)?;
        Ok((value, rest))
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.text)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("schema", &self.inner.text)
            .field("nodes", &self.inner.tree.nodes.len())
            .finish()
    }
}

impl Tree {
    pub(crate) fn node(&self, id: NodeId) -> &Schema {
        &self.nodes[id.0]
    }

    pub(crate) fn encode_binary(&self, id: NodeId, buf: &mut Vec<u8>, value: &Value) -> std::result::Result<(), EncodeError> {
        match self.node(id) {
            Schema::Null => primitive::null_encode(value),
            Schema::Boolean => primitive::boolean_binary_encode(buf, value),
            Schema::Int => primitive::int_binary_encode(buf, value),
            Schema::Long => primitive::long_binary_encode(buf, value),
            Schema::Float => primitive::float_binary_encode(buf, value),
            Schema::Double => primitive::double_binary_encode(buf, value),
            Schema::Bytes => primitive::bytes_binary_encode(buf, value),
            Schema::String => primitive::string_binary_encode(buf, value),
            Schema::Fixed { name, size } => container::fixed_binary_encode(buf, value, name, *size),
            Schema::Enum { name, symbols } => container::enum_binary_encode(buf, value, name, symbols),
            Schema::Array { items } => self.array_binary_encode(*items, buf, value),
            Schema::Map { values } => self.map_binary_encode(*values, buf, value),
            Schema::Record { name, fields } => self.record_binary_encode(name, fields, buf, value),
            Schema::Union { branches } => self.union_binary_encode(branches, buf, value),
        }
    }

    /// Fail once nesting passes the configured depth.
    fn check_depth(&self, depth: usize) -> std::result::Result<(), DecodeError> {
        if depth as u64 > self.limits.max_depth {
            return Err(DecodeError::invalid(format!(
                "nesting depth exceeds limit {}",
                self.limits.max_depth
            )));
        }
        Ok(())
    }

    pub(crate) fn decode_binary(&self, id: NodeId, input: &mut &[u8], depth: usize) -> std::result::Result<Value, DecodeError> {
        self.check_depth(depth)?;
        match self.node(id) {
            Schema::Null => Ok(Value::Null),
            Schema::Boolean => primitive::boolean_binary_decode(input),
            Schema::Int => primitive::int_binary_decode(input),
            Schema::Long => primitive::long_binary_decode(input),
            Schema::Float => primitive::float_binary_decode(input),
            Schema::Double => primitive::double_binary_decode(input),
            Schema::Bytes => primitive::bytes_binary_decode(input, &self.limits),
            Schema::String => primitive::string_binary_decode(input, &self.limits),
            Schema::Fixed { size, .. } => container::fixed_binary_decode(input, *size),
            Schema::Enum { name, symbols } => container::enum_binary_decode(input, name, symbols),
            Schema::Array { items } => self.array_binary_decode(*items, input, depth),
            Schema::Map { values } => self.map_binary_decode(*values, input, depth),
            Schema::Record { fields, .. } => self.record_binary_decode(fields, input, depth),
            Schema::Union { branches } => self.union_binary_decode(branches, input, depth),
        }
    }

    pub(crate) fn encode_text(&self, id: NodeId, buf: &mut Vec<u8>, value: &Value) -> std::result::Result<(), EncodeError> {
        match self.node(id) {
            Schema::Null => primitive::null_text_encode(buf, value),
            Schema::Boolean => primitive::boolean_text_encode(buf, value),
            Schema::Int => primitive::int_text_encode(buf, value),
            Schema::Long => primitive::long_text_encode(buf, value),
            Schema::Float => primitive::float_text_encode(buf, value),
            Schema::Double => primitive::double_text_encode(buf, value),
            Schema::Bytes => primitive::bytes_text_encode(buf, value),
            Schema::String => primitive::string_text_encode(buf, value),
            Schema::Fixed { name, size } => container::fixed_text_encode(buf, value, name, *size),
            Schema::Enum { name, symbols } => container::enum_text_encode(buf, value, name, symbols),
            Schema::Array { items } => self.array_text_encode(*items, buf, value),
            Schema::Map { values } => self.map_text_encode(*values, buf, value),
            Schema::Record { name, fields } => self.record_text_encode(name, fields, buf, value),
            Schema::Union { branches } => self.union_text_encode(branches, buf, value),
        }
    }

    pub(crate) fn decode_text(&self, id: NodeId, input: &mut &[u8], depth: usize) -> std::result::Result<Value, DecodeError> {
        self.check_depth(depth)?;
        match self.node(id) {
            Schema::Null => primitive::null_text_decode(input),
            Schema::Boolean => primitive::boolean_text_decode(input),
            Schema::Int => primitive::int_text_decode(input),
            Schema::Long => primitive::long_text_decode(input),
            Schema::Float => primitive::float_text_decode(input),
            Schema::Double => primitive::double_text_decode(input),
            Schema::Bytes => primitive::bytes_text_decode(input),
            Schema::String => primitive::string_text_decode(input),
            Schema::Fixed { name, size } => container::fixed_text_decode(input, name, *size),
            Schema::Enum { name, symbols } => container::enum_text_decode(input, name, symbols),
            Schema::Array { items } => self.array_text_decode(*items, input, depth),
            Schema::Map { values } => self.map_text_decode(*values, input, depth),
            Schema::Record { name, fields } => self.record_text_decode(name, fields, input, depth),
            Schema::Union { branches } => self.union_text_decode(branches, input, depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_codec_is_shareable() {
        assert_send_sync::<Codec>();
    }

    #[test]
    fn test_accessors() {
        let codec = Codec::new(r#"{"type":"map","values":"long"}"#).unwrap();
        assert_eq!(codec.type_name(), "map");
        assert_eq!(codec.to_string(), r#"{"type":"map","values":"long"}"#);
        assert!(matches!(codec.root(), Schema::Map { .. }));
    }

    #[test]
    fn test_failed_encode_restores_buffer() {
        let codec = Codec::new(r#"{"type":"array","items":"int"}"#).unwrap();
        let mut buf = vec![0xAA];
        let value = Value::Array(vec![Value::Int(1), Value::from("two")]);
        assert!(codec.binary_encode(&mut buf, &value).is_err());
        assert_eq!(buf, vec![0xAA]);
        assert!(codec.text_encode(&mut buf, &value).is_err());
        assert_eq!(buf, vec![0xAA]);
    }

    #[test]
    fn test_concurrent_use() {
        let codec = Codec::new(r#"["null","long","string"]"#).unwrap();
        let handles: Vec<_> = (0..4i64)
            .map(|i| {
                let codec = codec.clone();
                std::thread::spawn(move || {
                    let mut buf = Vec::new();
                    codec.binary_encode(&mut buf, &Value::Long(i)).unwrap();
                    let (value, rest) = codec.binary_decode(&buf).unwrap();
                    assert!(rest.is_empty());
                    value
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let value = handle.join().unwrap();
            assert_eq!(value.as_union_entry(), Some(("long", &Value::Long(i as i64))));
        }
    }
}
