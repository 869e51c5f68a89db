//! Field-level building blocks for validated entities.
//!
//! # Responsibility
//! - Define access tags that decide which fields callers may read or write.
//! - Define the value shapes an entity field can hold.
//!
//! # Invariants
//! - A `FieldValue` always reports exactly one `FieldKind`.
//! - Sequence values are owned; handing one out never aliases entity storage.

use crate::model::rule::Rule;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access tag attached to every declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAccess {
    /// Set at construction, readable afterwards, never writable.
    ReadOnly,
    /// Readable; writable only through a rule-checked mutation path.
    ReadWriteValidated,
    /// Neither readable nor writable from outside the owning type.
    InternalOnly,
}

impl FieldAccess {
    pub fn is_readable(self) -> bool {
        !matches!(self, Self::InternalOnly)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, Self::ReadWriteValidated)
    }
}

/// Shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Int,
    Text,
    Flag,
    Id,
    Sequence,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Text => "text",
            Self::Flag => "flag",
            Self::Id => "id",
            Self::Sequence => "sequence",
        }
    }
}

/// Value stored in one entity field.
///
/// Money and scores are whole integers (minor currency units, points), so
/// boundary comparisons are exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Flag(bool),
    Id(Uuid),
    Sequence(Vec<i64>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Int(_) => FieldKind::Int,
            Self::Text(_) => FieldKind::Text,
            Self::Flag(_) => FieldKind::Flag,
            Self::Id(_) => FieldKind::Id,
            Self::Sequence(_) => FieldKind::Sequence,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<Uuid> {
        match self {
            Self::Id(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[i64]> {
        match self {
            Self::Sequence(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        Self::Id(value)
    }
}

impl From<Vec<i64>> for FieldValue {
    fn from(values: Vec<i64>) -> Self {
        Self::Sequence(values)
    }
}

/// Declaration of one field in an entity schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) access: FieldAccess,
    pub(crate) kind: FieldKind,
    pub(crate) rule: Rule,
    pub(crate) element_rule: Option<Rule>,
}

impl FieldSpec {
    /// Declares a field with an accept-anything rule.
    pub fn new(name: impl Into<String>, access: FieldAccess, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            access,
            kind,
            rule: Rule::Any,
            element_rule: None,
        }
    }

    /// Sets the rule a whole-field value must satisfy.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rule = rule;
        self
    }

    /// Sets the rule every sequence element must satisfy.
    pub fn with_element_rule(mut self, rule: Rule) -> Self {
        self.element_rule = Some(rule);
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn access(&self) -> FieldAccess {
        self.access
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}
