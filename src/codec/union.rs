//! Union Resolution
//!
//! Binary form is the zigzag branch index followed by the branch encoding.
//! Text form is `null` for the null branch and `{"<type name>": value}`
//! otherwise. Decoders return a bare null or a single-entry map keyed by the
//! branch's type name.
//!
//! Branch selection on encode:
//! 1. A [`Value::Union`] tag selects the branch with that exact type name.
//! 2. A single-entry map keyed by a branch's type name, which is what the
//!    decoders return, selects that branch with the entry's value. This
//!    takes precedence over matching the map against `map` or `record`
//!    branches, so decoded values always encode back to the same bytes.
//! 3. Otherwise the first declared branch whose kind accepts the native
//!    value wins. Numbers only widen: int32 -> int64 -> float32 -> float64.
//!    An untagged map matches `map` and `record` alike, so the earlier
//!    declared of the two is used; tag the value to pick the other.

use std::collections::{BTreeMap, HashSet};

use tracing::trace;

use super::Tree;
use crate::error::{DecodeError, EncodeError, SchemaError};
use crate::schema::{NodeId, Schema, SchemaKind};
use crate::text;
use crate::value::Value;
use crate::wire;

/// Reject nested unions and branches that share a type name.
///
/// Unnamed kinds use their keyword as type name, so two `map` branches
/// collide exactly like two records with the same full name.
pub(crate) fn validate_branches(branches: &[(SchemaKind, String)]) -> Result<(), SchemaError> {
    if branches.is_empty() {
        return Err(SchemaError::InvalidUnion("union must have at least one branch".to_string()));
    }
    let mut seen = HashSet::new();
    for (kind, type_name) in branches {
        if *kind == SchemaKind::Union {
            return Err(SchemaError::InvalidUnion("union may not immediately contain another union".to_string()));
        }
        if !seen.insert(type_name.as_str()) {
            return Err(SchemaError::InvalidUnion(format!("duplicate branch: {}", type_name)));
        }
    }
    Ok(())
}

/// Branch kinds an untagged native value may select, in no particular order
fn accepting_kinds(value: &Value) -> &'static [SchemaKind] {
    use SchemaKind::*;
    match value {
        Value::Null => &[Null],
        Value::Boolean(_) => &[Boolean],
        Value::Int(_) => &[Int, Long, Float, Double],
        Value::Long(_) => &[Long, Float, Double],
        Value::Float(_) => &[Float, Double],
        Value::Double(_) => &[Double],
        Value::Bytes(b) if std::str::from_utf8(b).is_err() => &[Bytes],
        Value::Bytes(_) | Value::String(_) => &[Bytes, String],
        Value::Array(_) => &[Array],
        Value::Map(_) => &[Map, Record],
        Value::Union(..) => &[],
    }
}

impl Tree {
    fn candidates(&self, branches: &[NodeId]) -> Vec<String> {
        branches.iter().map(|b| self.node(*b).type_name().to_string()).collect()
    }

    /// Branch named by the key of a single-entry map, as produced by decode
    fn decoded_entry<'v>(&self, branches: &[NodeId], value: &'v Value) -> Option<(usize, &'v Value)> {
        let (key, inner) = value.as_union_entry()?;
        let index = branches.iter().position(|b| self.node(*b).type_name() == key)?;
        Some((index, inner))
    }

    /// Pick the branch index for `value` and the value to encode with it.
    pub(crate) fn select_branch<'v>(&self, branches: &[NodeId], value: &'v Value) -> Result<(usize, &'v Value), EncodeError> {
        if let Value::Union(tag, inner) = value {
            let index = branches
                .iter()
                .position(|b| self.node(*b).type_name() == tag.as_str())
                .ok_or_else(|| EncodeError::UnresolvableBranch {
                    name: tag.clone(),
                    candidates: self.candidates(branches),
                })?;
            trace!(branch = index, tag = %tag, "selected tagged union branch");
            return Ok((index, inner.as_ref()));
        }

        if let Some((index, inner)) = self.decoded_entry(branches, value) {
            trace!(branch = index, "selected union branch from decoded entry");
            return Ok((index, inner));
        }

        let accepting = accepting_kinds(value);
        let index = branches
            .iter()
            .position(|b| accepting.contains(&self.node(*b).kind()))
            .ok_or_else(|| EncodeError::NoMatchingBranch {
                received: value.category(),
                candidates: self.candidates(branches),
            })?;
        trace!(branch = index, received = value.category(), "selected untagged union branch");
        Ok((index, value))
    }

    fn read_branch(&self, branches: &[NodeId], input: &mut &[u8]) -> Result<NodeId, DecodeError> {
        let mut rest = *input;
        let index = wire::read_long(&mut rest)?;
        let branch = usize::try_from(index)
            .ok()
            .and_then(|i| branches.get(i))
            .ok_or_else(|| {
                DecodeError::invalid(format!(
                    "union: index must be between 0 and {}; read index: {}",
                    branches.len() - 1,
                    index
                ))
            })?;
        *input = rest;
        Ok(*branch)
    }

    /// Wrap a decoded branch value in its single-key map, except for null.
    fn wrap(&self, branch: NodeId, value: Value) -> Value {
        match self.node(branch) {
            Schema::Null => Value::Null,
            schema => Value::Map(BTreeMap::from([(schema.type_name().to_string(), value)])),
        }
    }

    pub(crate) fn union_binary_encode(&self, branches: &[NodeId], buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
        let (index, inner) = self.select_branch(branches, value)?;
        wire::write_long(buf, index as i64);
        self.encode_binary(branches[index], buf, inner)
    }

    pub(crate) fn union_binary_decode(&self, branches: &[NodeId], input: &mut &[u8], depth: usize) -> Result<Value, DecodeError> {
        let branch = self.read_branch(branches, input)?;
        let value = self.decode_binary(branch, input, depth + 1)?;
        Ok(self.wrap(branch, value))
    }

    pub(crate) fn union_text_encode(&self, branches: &[NodeId], buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
        let (index, inner) = self.select_branch(branches, value)?;
        let branch = branches[index];
        match self.node(branch) {
            Schema::Null => self.encode_text(branch, buf, inner),
            schema => {
                buf.push(b'{');
                text::write_quoted(buf, schema.type_name().as_bytes(), text::StringMode::Utf8);
                buf.push(b':');
                self.encode_text(branch, buf, inner)?;
                buf.push(b'}');
                Ok(())
            }
        }
    }

    pub(crate) fn union_text_decode(&self, branches: &[NodeId], input: &mut &[u8], depth: usize) -> Result<Value, DecodeError> {
        if text::peek(input) == Some(b'n') {
            let null_branch = branches
                .iter()
                .find(|b| matches!(self.node(**b), Schema::Null))
                .ok_or_else(|| DecodeError::invalid("union: null given but union has no null branch"))?;
            text::expect_literal(input, "null")?;
            return Ok(self.wrap(*null_branch, Value::Null));
        }

        text::expect(input, b'{')?;
        let tag = text::read_string(input)?;
        let branch = *branches
            .iter()
            .find(|b| self.node(**b).type_name() == tag)
            .ok_or_else(|| DecodeError::invalid(format!("union: no branch named {:?}", tag)))?;
        text::expect(input, b':')?;
        let value = self.decode_text(branch, input, depth + 1)?;
        text::expect(input, b'}')?;
        Ok(self.wrap(branch, value))
    }
}
