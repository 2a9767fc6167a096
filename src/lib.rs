//! Schema Codec
//!
//! Compiles Avro schemas into reusable codecs that convert native values to
//! and from the compact binary encoding and the equivalent JSON text form.
//!
//! ## Features
//!
//! - **Every schema kind**: primitives, records, enums, arrays, maps, fixed, and unions
//! - **Recursive types**: a record may refer to itself by name
//! - **Union resolution**: explicit branch tags, or first matching branch with numeric widening
//! - **Shareable codecs**: compiled codecs are immutable and `Send + Sync`
//! - **Bounded decoding**: declared lengths and block counts are checked before allocating
//!
//! ## Example
//!
//! ```
//! use schema_codec::{Codec, Value};
//!
//! let codec = Codec::new(r#"["null","int"]"#).unwrap();
//!
//! let mut buf = Vec::new();
//! codec.binary_encode(&mut buf, &Value::union("int", 3)).unwrap();
//! assert_eq!(buf, vec![0x02, 0x06]);
//!
//! let (decoded, rest) = codec.binary_decode(&buf).unwrap();
//! assert!(rest.is_empty());
//! assert_eq!(decoded.as_union_entry(), Some(("int", &Value::Int(3))));
//! ```

pub mod codec;
pub mod compiler;
pub mod config;
pub mod error;
pub mod name;
pub mod registry;
pub mod schema;
pub mod text;
pub mod value;
pub mod wire;

pub use codec::Codec;
pub use config::{CodecConfig, DecodeLimits};
pub use error::{DecodeError, EncodeError, NameError, NameRule, Result, SchemaError};
pub use name::Name;
pub use schema::{Field, NodeId, Schema, SchemaKind};
pub use value::Value;

/// Compile schema text into a [`Codec`] with default limits.
pub fn compile(schema: &str) -> Result<Codec> {
    Codec::new(schema)
}
