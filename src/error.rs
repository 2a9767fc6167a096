//! Error types for schema compilation and the codecs

use thiserror::Error;

/// Result type for schema compilation
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Which naming rule a name component broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// Component was empty (e.g. `a..b` or a trailing dot)
    Empty,
    /// First character was not `[A-Za-z_]`
    FirstCharacter,
    /// A later character was not `[A-Za-z0-9_]`
    OtherCharacter,
}

/// A malformed type name, field name, or enum symbol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid name component {component:?}: {}", rule_message(.rule))]
pub struct NameError {
    pub component: String,
    pub rule: NameRule,
}

fn rule_message(rule: &NameRule) -> &'static str {
    match rule {
        NameRule::Empty => "must not be empty",
        NameRule::FirstCharacter => "must start with [A-Za-z_]",
        NameRule::OtherCharacter => "second and remaining characters must be [A-Za-z0-9_]",
    }
}

/// Schema compilation errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidName(#[from] NameError),

    #[error("duplicate type name: {0}")]
    DuplicateName(String),

    #[error("undefined type reference: {0}")]
    UndefinedReference(String),

    #[error("invalid union: {0}")]
    InvalidUnion(String),

    #[error("invalid default for field {field:?}: {reason}")]
    InvalidDefault { field: String, reason: String },

    #[error("invalid schema: {0}")]
    InvalidFormat(String),
}

/// Errors raised while encoding a native value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("{codec}: expected: {expected}; received: {received}")]
    TypeMismatch {
        codec: String,
        expected: &'static str,
        received: &'static str,
    },

    #[error("{codec}: value out of range: {value}")]
    OutOfRange { codec: String, value: String },

    #[error("{codec}: unknown symbol: {symbol:?}")]
    UnknownSymbol { codec: String, symbol: String },

    #[error("{codec}: expected {expected} bytes; received {received}")]
    FixedSize {
        codec: String,
        expected: usize,
        received: usize,
    },

    #[error("{codec}: missing field {field:?} with no default")]
    MissingField { codec: String, field: String },

    #[error("union: no branch named {name:?}; candidates: {candidates:?}")]
    UnresolvableBranch { name: String, candidates: Vec<String> },

    #[error("union: no branch accepts a {received}; candidates: {candidates:?}")]
    NoMatchingBranch {
        received: &'static str,
        candidates: Vec<String>,
    },
}

/// Errors raised while decoding binary or text input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended before a complete value could be read
    #[error("short buffer")]
    ShortBuffer,

    /// Input violates the format rules
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
}

impl DecodeError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        DecodeError::InvalidEncoding(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_error_message() {
        let err = NameError {
            component: "9lives".to_string(),
            rule: NameRule::FirstCharacter,
        };
        assert!(err.to_string().contains("start with [A-Za-z_]"));
        assert!(err.to_string().contains("9lives"));
    }

    #[test]
    fn test_short_buffer_message() {
        assert_eq!(DecodeError::ShortBuffer.to_string(), "short buffer");
    }
}
