//! Native values accepted by encoders and produced by decoders

use std::collections::BTreeMap;

/// A native value.
///
/// Records and maps both use [`Value::Map`]. Enum symbols are strings and
/// fixed values are bytes. [`Value::Union`] is the explicit union tag used to
/// pick a branch by type name; decoders never produce it, returning a
/// single-entry map keyed by the branch's type name instead. Encoders accept
/// that map as a tag too, so decoded values encode back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Union(String, Box<Value>),
}

impl Value {
    /// Build an explicit union tag value.
    pub fn union(branch: impl Into<String>, value: impl Into<Value>) -> Self {
        Value::Union(branch.into(), Box::new(value.into()))
    }

    /// Name of the native category, used in error messages
    pub fn category(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int32",
            Value::Long(_) => "int64",
            Value::Float(_) => "float32",
            Value::Double(_) => "float64",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Union(..) => "union tag",
        }
    }

    /// Rewrite explicit union tags into the shape decoders return: the
    /// `null` branch becomes a bare null and any other branch a single-entry
    /// map keyed by its type name.
    pub fn into_decoded(self) -> Value {
        match self {
            Value::Union(tag, _) if tag == "null" => Value::Null,
            Value::Union(tag, inner) => Value::Map(BTreeMap::from([(tag, inner.into_decoded())])),
            Value::Array(items) => Value::Array(items.into_iter().map(Value::into_decoded).collect()),
            Value::Map(entries) => Value::Map(entries.into_iter().map(|(k, v)| (k, v.into_decoded())).collect()),
            other => other,
        }
    }

    /// Returns the single `(branch, value)` entry of a decoded union result.
    pub fn as_union_entry(&self) -> Option<(&str, &Value)> {
        match self {
            Value::Map(map) if map.len() == 1 => map.iter().next().map(|(k, v)| (k.as_str(), v)),
            _ => None,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Long(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(opt: Option<V>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_constructor() {
        let v = Value::union("int", 3);
        assert_eq!(v, Value::Union("int".to_string(), Box::new(Value::Int(3))));
    }

    #[test]
    fn test_map_from_iter() {
        let v: Value = [("a", 1), ("b", 2)].into_iter().collect();
        match v {
            Value::Map(map) => {
                assert_eq!(map.len(), 2);
                assert_eq!(map["a"], Value::Int(1));
            }
            other => panic!("Expected Map, got {:?}", other),
        }
    }

    #[test]
    fn test_union_entry() {
        let v: Value = [("com.example.animals", "dog")].into_iter().collect();
        assert_eq!(v.as_union_entry(), Some(("com.example.animals", &Value::from("dog"))));
        assert_eq!(Value::Null.as_union_entry(), None);
    }

    #[test]
    fn test_into_decoded() {
        assert_eq!(Value::union("null", ()).into_decoded(), Value::Null);

        let tagged = Value::Array(vec![Value::union("int", 3), Value::Int(4)]);
        let expected = Value::Array(vec![[("int", 3)].into_iter().collect(), Value::Int(4)]);
        assert_eq!(tagged.into_decoded(), expected);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7i64)), Value::Long(7));
    }
}
