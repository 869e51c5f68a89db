//! Error types for schema definition and entity operations.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// One failed validation: which field, and which constraint it broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    field: String,
    reason: String,
}

impl Rejection {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Errors returned by `ValidatedEntity` operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// Construction input broke one or more field invariants.
    InvalidInitialState(Vec<Rejection>),
    /// A mutation was rejected and the entity uses `RejectPolicy::Signal`.
    ValidationRejected(Rejection),
    UnknownField(String),
    NotReadable(String),
    NotWritable(String),
    NotASequence(String),
}

impl EntityError {
    /// Returns the rejection for `ValidationRejected`, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::ValidationRejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl Display for EntityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInitialState(rejections) => {
                write!(f, "invalid initial state")?;
                for (index, rejection) in rejections.iter().enumerate() {
                    let sep = if index == 0 { ": " } else { "; " };
                    write!(f, "{sep}{rejection}")?;
                }
                Ok(())
            }
            Self::ValidationRejected(rejection) => write!(f, "validation rejected: {rejection}"),
            Self::UnknownField(name) => write!(f, "unknown field: {name}"),
            Self::NotReadable(name) => write!(f, "field is not readable: {name}"),
            Self::NotWritable(name) => write!(f, "field is not writable: {name}"),
            Self::NotASequence(name) => write!(f, "field is not a sequence: {name}"),
        }
    }
}

impl Error for EntityError {}

/// Errors raised while building an `EntitySchema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    EmptyName,
    DuplicateField(String),
    DuplicateDerivation(String),
    ElementRuleOnScalar(String),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "schema, field and derivation names must not be empty"),
            Self::DuplicateField(name) => write!(f, "field declared twice: {name}"),
            Self::DuplicateDerivation(name) => write!(f, "derivation declared twice: {name}"),
            Self::ElementRuleOnScalar(name) => {
                write!(f, "element rule requires a sequence field: {name}")
            }
        }
    }
}

impl Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::{EntityError, Rejection, SchemaError};

    #[test]
    fn initial_state_error_lists_every_rejection() {
        let err = EntityError::InvalidInitialState(vec![
            Rejection::new("balance", "value must be >= 0"),
            Rejection::new("id", "id must not be nil"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid initial state: balance: value must be >= 0; id: id must not be nil"
        );
    }

    #[test]
    fn rejection_is_exposed_only_for_validation_errors() {
        let err = EntityError::ValidationRejected(Rejection::new("age", "too old"));
        assert_eq!(err.rejection().map(Rejection::field), Some("age"));
        assert!(EntityError::UnknownField("x".to_string())
            .rejection()
            .is_none());
    }

    #[test]
    fn schema_errors_name_the_field() {
        assert_eq!(
            SchemaError::ElementRuleOnScalar("balance".to_string()).to_string(),
            "element rule requires a sequence field: balance"
        );
    }
}
