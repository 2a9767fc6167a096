//! Schema types and structures
//!
//! A compiled schema is an arena of [`Schema`] nodes addressed by [`NodeId`].
//! Named types may refer back to themselves, so children hold handles into
//! the arena rather than owning their child schemas.

use std::fmt;

use crate::name::Name;
use crate::value::Value;

/// Handle to a node in the schema arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A single record field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name, validated like a name component
    pub name: String,
    /// Schema of the field value
    pub schema: NodeId,
    /// Declared default, converted to a native value
    pub default: Option<Value>,
}

/// One node of a compiled schema
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Fixed { name: Name, size: usize },
    Enum { name: Name, symbols: Vec<String> },
    Array { items: NodeId },
    Map { values: NodeId },
    Record { name: Name, fields: Vec<Field> },
    Union { branches: Vec<NodeId> },
}

/// Category of a schema node, used for union branch matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Fixed,
    Enum,
    Array,
    Map,
    Record,
    Union,
}

impl SchemaKind {
    /// Keyword for the kind as written in schema text
    pub fn keyword(&self) -> &'static str {
        match self {
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Int => "int",
            SchemaKind::Long => "long",
            SchemaKind::Float => "float",
            SchemaKind::Double => "double",
            SchemaKind::Bytes => "bytes",
            SchemaKind::String => "string",
            SchemaKind::Fixed => "fixed",
            SchemaKind::Enum => "enum",
            SchemaKind::Array => "array",
            SchemaKind::Map => "map",
            SchemaKind::Record => "record",
            SchemaKind::Union => "union",
        }
    }

    /// Look up a primitive kind by its keyword
    pub fn primitive(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "null" => SchemaKind::Null,
            "boolean" => SchemaKind::Boolean,
            "int" => SchemaKind::Int,
            "long" => SchemaKind::Long,
            "float" => SchemaKind::Float,
            "double" => SchemaKind::Double,
            "bytes" => SchemaKind::Bytes,
            "string" => SchemaKind::String,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether values of this kind carry a full name
    pub fn is_named(&self) -> bool {
        matches!(self, SchemaKind::Fixed | SchemaKind::Enum | SchemaKind::Record)
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl Schema {
    /// Build the primitive node for a kind, if it is one
    pub(crate) fn from_primitive(kind: SchemaKind) -> Option<Self> {
        let schema = match kind {
            SchemaKind::Null => Schema::Null,
            SchemaKind::Boolean => Schema::Boolean,
            SchemaKind::Int => Schema::Int,
            SchemaKind::Long => Schema::Long,
            SchemaKind::Float => Schema::Float,
            SchemaKind::Double => Schema::Double,
            SchemaKind::Bytes => Schema::Bytes,
            SchemaKind::String => Schema::String,
            _ => return None,
        };
        Some(schema)
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            Schema::Null => SchemaKind::Null,
            Schema::Boolean => SchemaKind::Boolean,
            Schema::Int => SchemaKind::Int,
            Schema::Long => SchemaKind::Long,
            Schema::Float => SchemaKind::Float,
            Schema::Double => SchemaKind::Double,
            Schema::Bytes => SchemaKind::Bytes,
            Schema::String => SchemaKind::String,
            Schema::Fixed { .. } => SchemaKind::Fixed,
            Schema::Enum { .. } => SchemaKind::Enum,
            Schema::Array { .. } => SchemaKind::Array,
            Schema::Map { .. } => SchemaKind::Map,
            Schema::Record { .. } => SchemaKind::Record,
            Schema::Union { .. } => SchemaKind::Union,
        }
    }

    /// The name of a named type
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Fixed { name, .. } | Schema::Enum { name, .. } | Schema::Record { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Type name used for union tags: the full name for named types,
    /// otherwise the kind keyword.
    pub fn type_name(&self) -> &str {
        match self.name() {
            Some(name) => name.full_name(),
            None => self.kind().keyword(),
        }
    }
}
