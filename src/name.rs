//! Name Resolution
//!
//! Builds fully qualified names for records, enums, and fixed types.
//! A name that already contains a dot is taken as the full name; otherwise
//! the local namespace wins over the enclosing one. Every dot-separated
//! component of the result must match `[A-Za-z_][A-Za-z0-9_]*`.

use std::fmt;

use crate::error::{NameError, NameRule};

/// A fully qualified type name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    full_name: String,
    namespace: String,
}

impl Name {
    /// Resolve `name` against its local and enclosing namespaces.
    ///
    /// Empty namespace strings are treated as absent.
    pub fn new(name: &str, namespace: &str, enclosing_namespace: &str) -> Result<Self, NameError> {
        let (full_name, namespace) = match name.rfind('.') {
            Some(index) => (name.to_string(), name[..index].to_string()),
            None if !namespace.is_empty() => (format!("{}.{}", namespace, name), namespace.to_string()),
            None if !enclosing_namespace.is_empty() => (
                format!("{}.{}", enclosing_namespace, name),
                enclosing_namespace.to_string(),
            ),
            None => (name.to_string(), String::new()),
        };

        for component in full_name.split('.') {
            check_component(component)?;
        }

        Ok(Self { full_name, namespace })
    }

    /// The dot-separated full name (e.g. `com.example.Thing`)
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The namespace portion, empty for the null namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// Validate a single name component; also used for field names and enum symbols.
pub fn check_component(component: &str) -> Result<(), NameError> {
    let fail = |rule| {
        Err(NameError {
            component: component.to_string(),
            rule,
        })
    };

    let mut chars = component.chars();
    match chars.next() {
        None => return fail(NameRule::Empty),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => return fail(NameRule::FirstCharacter),
        Some(_) => {}
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return fail(NameRule::OtherCharacter);
    }
    Ok(())
}
