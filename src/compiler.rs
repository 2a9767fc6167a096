//! Schema Compiler
//!
//! Turns schema text into an arena of [`Schema`] nodes in one depth-first
//! pass. Named types reserve their slot and register their name before any
//! child is compiled, which is what lets a record field refer to the record
//! that contains it.

use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

use crate::codec::union::validate_branches;
use crate::error::{Result, SchemaError};
use crate::name::{check_component, Name};
use crate::registry::NameRegistry;
use crate::schema::{Field, NodeId, Schema, SchemaKind};
use crate::value::Value;

/// Output of a successful compilation
#[derive(Debug)]
pub struct Compiled {
    pub nodes: Vec<Schema>,
    pub root: NodeId,
}

/// Arena slot: named types sit in `Pending` while their children compile
#[derive(Debug)]
enum Slot {
    Pending { kind: SchemaKind, name: Name },
    Ready(Schema),
}

/// A field default waiting for the arena to be complete
#[derive(Debug)]
struct PendingDefault {
    record: NodeId,
    field: usize,
    json: Json,
}

/// Compile schema text into a node arena.
pub fn compile(text: &str) -> Result<Compiled> {
    let json = match serde_json::from_str::<Json>(text) {
        Ok(json) => json,
        // a bare primitive keyword such as `int` is accepted without quotes
        Err(_) if SchemaKind::primitive(text.trim()).is_some() => Json::String(text.trim().to_string()),
        Err(e) => return Err(e.into()),
    };

    let mut compiler = Compiler::default();
    let root = compiler.compile_value(&json, "")?;
    let compiled = compiler.finish(root)?;

    debug!(
        nodes = compiled.nodes.len(),
        root = compiled.nodes[root.0].type_name(),
        "compiled schema"
    );
    Ok(compiled)
}

#[derive(Debug, Default)]
struct Compiler {
    slots: Vec<Slot>,
    registry: NameRegistry,
    defaults: Vec<PendingDefault>,
}

impl Compiler {
    fn push(&mut self, schema: Schema) -> NodeId {
        self.slots.push(Slot::Ready(schema));
        NodeId(self.slots.len() - 1)
    }

    /// Reserve a slot for a named type and register its name.
    fn reserve(&mut self, kind: SchemaKind, name: Name) -> Result<NodeId> {
        let id = NodeId(self.slots.len());
        self.registry.register(&name, id)?;
        self.slots.push(Slot::Pending { kind, name });
        Ok(id)
    }

    fn fill(&mut self, id: NodeId, schema: Schema) {
        self.slots[id.0] = Slot::Ready(schema);
    }

    /// Kind and union tag name of a slot, available even while pending
    fn describe(&self, id: NodeId) -> (SchemaKind, String) {
        match &self.slots[id.0] {
            Slot::Pending { kind, name } => (*kind, name.full_name().to_string()),
            Slot::Ready(schema) => (schema.kind(), schema.type_name().to_string()),
        }
    }

    fn compile_value(&mut self, json: &Json, enclosing: &str) -> Result<NodeId> {
        match json {
            Json::String(s) => self.compile_reference(s, enclosing),
            Json::Array(branches) => self.compile_union(branches, enclosing),
            Json::Object(attrs) => self.compile_object(attrs, enclosing),
            other => Err(SchemaError::InvalidFormat(format!(
                "schema must be a string, array, or object: {}",
                other
            ))),
        }
    }

    fn compile_reference(&mut self, reference: &str, enclosing: &str) -> Result<NodeId> {
        if let Some(schema) = SchemaKind::primitive(reference).and_then(Schema::from_primitive) {
            return Ok(self.push(schema));
        }
        self.registry.resolve(reference, enclosing)
    }

    fn compile_union(&mut self, branches: &[Json], enclosing: &str) -> Result<NodeId> {
        let mut ids = Vec::with_capacity(branches.len());
        for branch in branches {
            ids.push(self.compile_value(branch, enclosing)?);
        }
        let described: Vec<_> = ids.iter().map(|id| self.describe(*id)).collect();
        validate_branches(&described)?;
        Ok(self.push(Schema::Union { branches: ids }))
    }

    fn compile_object(&mut self, attrs: &Map<String, Json>, enclosing: &str) -> Result<NodeId> {
        let type_attr = attrs
            .get("type")
            .ok_or_else(|| SchemaError::InvalidFormat("schema object missing \"type\"".to_string()))?;

        let type_name = match type_attr {
            Json::String(s) => s.as_str(),
            // {"type": {...}} or {"type": [...]} wraps another schema
            nested => return self.compile_value(nested, enclosing),
        };

        match type_name {
            "array" => {
                let items = required(attrs, "items", "array")?;
                let items = self.compile_value(items, enclosing)?;
                Ok(self.push(Schema::Array { items }))
            }
            "map" => {
                let values = required(attrs, "values", "map")?;
                let values = self.compile_value(values, enclosing)?;
                Ok(self.push(Schema::Map { values }))
            }
            "record" | "error" => self.compile_record(attrs, enclosing),
            "enum" => self.compile_enum(attrs, enclosing),
            "fixed" => self.compile_fixed(attrs, enclosing),
            other => self.compile_reference(other, enclosing),
        }
    }

    fn compile_record(&mut self, attrs: &Map<String, Json>, enclosing: &str) -> Result<NodeId> {
        let name = type_name(attrs, enclosing, "record")?;
        let namespace = name.namespace().to_string();
        let id = self.reserve(SchemaKind::Record, name.clone())?;

        let field_defs = required(attrs, "fields", "record")?
            .as_array()
            .ok_or_else(|| SchemaError::InvalidFormat(format!("record {}: \"fields\" must be an array", name)))?;

        let mut fields: Vec<Field> = Vec::with_capacity(field_defs.len());
        for def in field_defs {
            let def = def
                .as_object()
                .ok_or_else(|| SchemaError::InvalidFormat(format!("record {}: field must be an object", name)))?;
            let field_name = def
                .get("name")
                .and_then(Json::as_str)
                .ok_or_else(|| SchemaError::InvalidFormat(format!("record {}: field missing \"name\"", name)))?;
            check_component(field_name)?;
            if fields.iter().any(|f| f.name == field_name) {
                return Err(SchemaError::InvalidFormat(format!(
                    "record {}: duplicate field name: {}",
                    name, field_name
                )));
            }

            let field_type = def.get("type").ok_or_else(|| {
                SchemaError::InvalidFormat(format!("record {}: field {} missing \"type\"", name, field_name))
            })?;
            let schema = self.compile_value(field_type, &namespace)?;

            if let Some(json) = def.get("default") {
                self.defaults.push(PendingDefault {
                    record: id,
                    field: fields.len(),
                    json: json.clone(),
                });
            }
            fields.push(Field {
                name: field_name.to_string(),
                schema,
                default: None,
            });
        }

        trace!(record = %name, fields = fields.len(), "compiled record");
        self.fill(id, Schema::Record { name, fields });
        Ok(id)
    }

    fn compile_enum(&mut self, attrs: &Map<String, Json>, enclosing: &str) -> Result<NodeId> {
        let name = type_name(attrs, enclosing, "enum")?;
        let id = self.reserve(SchemaKind::Enum, name.clone())?;

        let symbol_defs = required(attrs, "symbols", "enum")?
            .as_array()
            .ok_or_else(|| SchemaError::InvalidFormat(format!("enum {}: \"symbols\" must be an array", name)))?;
        if symbol_defs.is_empty() {
            return Err(SchemaError::InvalidFormat(format!("enum {}: \"symbols\" must not be empty", name)));
        }

        let mut symbols: Vec<String> = Vec::with_capacity(symbol_defs.len());
        for symbol in symbol_defs {
            let symbol = symbol
                .as_str()
                .ok_or_else(|| SchemaError::InvalidFormat(format!("enum {}: symbols must be strings", name)))?;
            check_component(symbol)?;
            if symbols.iter().any(|s| s == symbol) {
                return Err(SchemaError::InvalidFormat(format!("enum {}: duplicate symbol: {}", name, symbol)));
            }
            symbols.push(symbol.to_string());
        }

        self.fill(id, Schema::Enum { name, symbols });
        Ok(id)
    }

    fn compile_fixed(&mut self, attrs: &Map<String, Json>, enclosing: &str) -> Result<NodeId> {
        let name = type_name(attrs, enclosing, "fixed")?;
        let size = required(attrs, "size", "fixed")?
            .as_u64()
            .and_then(|size| usize::try_from(size).ok())
            .ok_or_else(|| SchemaError::InvalidFormat(format!("fixed {}: \"size\" must be a non-negative integer", name)))?;

        let id = self.reserve(SchemaKind::Fixed, name.clone())?;
        self.fill(id, Schema::Fixed { name, size });
        Ok(id)
    }

    /// Unwrap the arena and convert field defaults now that every node exists.
    fn finish(self, root: NodeId) -> Result<Compiled> {
        let mut nodes = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            match slot {
                Slot::Ready(schema) => nodes.push(schema),
                Slot::Pending { name, .. } => {
                    return Err(SchemaError::InvalidFormat(format!("type {} was never completed", name)));
                }
            }
        }

        // defaults are queued innermost first, so nested record defaults
        // are already converted when an outer default needs them
        for pending in self.defaults {
            let (field_name, field_schema) = match &nodes[pending.record.0] {
                Schema::Record { fields, .. } => (fields[pending.field].name.clone(), fields[pending.field].schema),
                _ => continue,
            };
            let value = default_value(&nodes, field_schema, &pending.json).map_err(|reason| {
                SchemaError::InvalidDefault {
                    field: field_name.clone(),
                    reason,
                }
            })?;
            if let Schema::Record { fields, .. } = &mut nodes[pending.record.0] {
                fields[pending.field].default = Some(value);
            }
        }

        Ok(Compiled { nodes, root })
    }
}

fn required<'a>(attrs: &'a Map<String, Json>, key: &str, kind: &str) -> Result<&'a Json> {
    attrs
        .get(key)
        .ok_or_else(|| SchemaError::InvalidFormat(format!("{} schema missing {:?}", kind, key)))
}

fn type_name(attrs: &Map<String, Json>, enclosing: &str, kind: &str) -> Result<Name> {
    let name = attrs
        .get("name")
        .and_then(Json::as_str)
        .ok_or_else(|| SchemaError::InvalidFormat(format!("{} schema missing \"name\"", kind)))?;
    let namespace = match attrs.get("namespace") {
        None | Some(Json::Null) => "",
        Some(Json::String(ns)) => ns.as_str(),
        Some(_) => {
            return Err(SchemaError::InvalidFormat(format!("{} {}: \"namespace\" must be a string", kind, name)));
        }
    };
    Ok(Name::new(name, namespace, enclosing)?)
}

/// Convert a JSON default into a native value for the schema at `id`.
fn default_value(nodes: &[Schema], id: NodeId, json: &Json) -> std::result::Result<Value, String> {
    let schema = &nodes[id.0];
    let mismatch = || format!("expected {} default; found {}", schema.type_name(), json);

    match schema {
        Schema::Null => json.is_null().then_some(Value::Null).ok_or_else(mismatch),
        Schema::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(mismatch),
        Schema::Int => json
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Value::Int)
            .ok_or_else(mismatch),
        Schema::Long => json.as_i64().map(Value::Long).ok_or_else(mismatch),
        Schema::Float => json.as_f64().map(|f| Value::Float(f as f32)).ok_or_else(mismatch),
        Schema::Double => json.as_f64().map(Value::Double).ok_or_else(mismatch),
        Schema::String => json.as_str().map(Value::from).ok_or_else(mismatch),
        Schema::Bytes => json.as_str().and_then(latin1_bytes).map(Value::Bytes).ok_or_else(mismatch),
        Schema::Fixed { size, .. } => json
            .as_str()
            .and_then(latin1_bytes)
            .filter(|bytes| bytes.len() == *size)
            .map(Value::Bytes)
            .ok_or_else(mismatch),
        Schema::Enum { symbols, .. } => json
            .as_str()
            .filter(|s| symbols.iter().any(|symbol| symbol == s))
            .map(Value::from)
            .ok_or_else(mismatch),
        Schema::Array { items } => {
            let elements = json.as_array().ok_or_else(mismatch)?;
            elements
                .iter()
                .map(|element| default_value(nodes, *items, element))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Schema::Map { values } => {
            let entries = json.as_object().ok_or_else(mismatch)?;
            let mut map = std::collections::BTreeMap::new();
            for (key, value) in entries {
                map.insert(key.clone(), default_value(nodes, *values, value)?);
            }
            Ok(Value::Map(map))
        }
        Schema::Record { fields, .. } => {
            let entries = json.as_object().ok_or_else(mismatch)?;
            let mut record = std::collections::BTreeMap::new();
            for field in fields {
                let value = match (entries.get(&field.name), &field.default) {
                    (Some(v), _) => default_value(nodes, field.schema, v)?,
                    (None, Some(default)) => default.clone(),
                    (None, None) => return Err(format!("missing value for field {:?}", field.name)),
                };
                record.insert(field.name.clone(), value);
            }
            Ok(Value::Map(record))
        }
        Schema::Union { branches } => {
            // a union default always belongs to the first branch
            let first = *branches.first().ok_or_else(mismatch)?;
            let value = default_value(nodes, first, json)?;
            match &nodes[first.0] {
                Schema::Null => Ok(Value::Null),
                branch => Ok(Value::union(branch.type_name(), value)),
            }
        }
    }
}

/// Map each char of a JSON string to one byte; chars above U+00FF are rejected.
fn latin1_bytes(s: &str) -> Option<Vec<u8>> {
    s.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}
