//! Name Registry
//!
//! Maps full names to arena slots while a single schema compiles. Names are
//! registered before their children are compiled so a record can refer to
//! itself. The registry is dropped when compilation returns.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{Result, SchemaError};
use crate::name::Name;
use crate::schema::NodeId;

/// Append-only map of full name to arena slot
#[derive(Debug, Default)]
pub struct NameRegistry {
    /// full name -> slot in the arena
    slots: HashMap<String, NodeId>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name for a slot.
    ///
    /// Registration is append-only: a name defined twice in one schema is an error.
    pub fn register(&mut self, name: &Name, id: NodeId) -> Result<()> {
        if self.slots.contains_key(name.full_name()) {
            return Err(SchemaError::DuplicateName(name.full_name().to_string()));
        }
        trace!(name = %name, slot = id.0, "registered named type");
        self.slots.insert(name.full_name().to_string(), id);
        Ok(())
    }

    /// Resolve a type reference against the enclosing namespace.
    ///
    /// A bare reference is tried as `enclosing.reference` first, then as a
    /// name in the null namespace.
    pub fn resolve(&self, reference: &str, enclosing_namespace: &str) -> Result<NodeId> {
        if !reference.contains('.') && !enclosing_namespace.is_empty() {
            let qualified = format!("{}.{}", enclosing_namespace, reference);
            if let Some(id) = self.slots.get(&qualified) {
                return Ok(*id);
            }
        }
        self.slots
            .get(reference)
            .copied()
            .ok_or_else(|| SchemaError::UndefinedReference(reference.to_string()))
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = NameRegistry::new();
        let name = Name::new("Thing", "com.example", "").unwrap();
        registry.register(&name, NodeId(3)).unwrap();

        assert_eq!(registry.resolve("com.example.Thing", "").unwrap(), NodeId(3));
        assert_eq!(registry.resolve("Thing", "com.example").unwrap(), NodeId(3));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = NameRegistry::new();
        let name = Name::new("com.example.one", "", "").unwrap();
        registry.register(&name, NodeId(0)).unwrap();

        let again = Name::new("one", "com.example", "").unwrap();
        let result = registry.register(&again, NodeId(1));
        assert!(matches!(result, Err(SchemaError::DuplicateName(n)) if n == "com.example.one"));
    }

    #[test]
    fn test_undefined_reference() {
        let registry = NameRegistry::new();
        assert!(registry.is_empty());
        let result = registry.resolve("Missing", "com.example");
        assert!(matches!(result, Err(SchemaError::UndefinedReference(n)) if n == "Missing"));
    }
}
