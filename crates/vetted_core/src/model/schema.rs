//! Entity schemas: declared fields plus computed accessors.
//!
//! # Responsibility
//! - Declare which fields an entity has, how they may be accessed, and which
//!   rule guards each of them.
//! - Register derived accessors computed from stored state.
//!
//! # Invariants
//! - Field and derivation names are non-empty and unique within a schema.
//! - Element rules only attach to sequence fields.

use crate::model::entity::FieldView;
use crate::model::error::SchemaError;
use crate::model::field::{FieldKind, FieldSpec};
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

type DeriveFn = Arc<dyn Fn(&FieldView<'_>) -> Option<f64> + Send + Sync>;

/// Named computed accessor over entity state.
///
/// When the computation yields `None` (for example an empty sequence), the
/// registered default is returned instead.
#[derive(Clone)]
pub struct Derivation {
    name: String,
    default: f64,
    compute: DeriveFn,
}

impl Derivation {
    pub fn new<F>(name: impl Into<String>, default: f64, compute: F) -> Self
    where
        F: Fn(&FieldView<'_>) -> Option<f64> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            default,
            compute: Arc::new(compute),
        }
    }

    /// Arithmetic mean of an integer sequence field, `0.0` when empty.
    pub fn mean(name: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(name, 0.0, move |view| {
            let values = view.sequence(field.as_str())?;
            if values.is_empty() {
                return None;
            }
            let sum: i128 = values.iter().map(|value| i128::from(*value)).sum();
            Some(sum as f64 / values.len() as f64)
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub(crate) fn evaluate(&self, view: &FieldView<'_>) -> f64 {
        (self.compute)(view).unwrap_or(self.default)
    }
}

impl Debug for Derivation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derivation")
            .field("name", &self.name)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// Immutable description of an entity's fields and derived accessors.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: String,
    fields: Vec<FieldSpec>,
    derivations: Vec<Derivation>,
}

impl EntitySchema {
    pub fn builder(name: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            derivations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        self.fields.as_slice()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub(crate) fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|spec| spec.name == name)
    }

    pub fn derivation(&self, name: &str) -> Option<&Derivation> {
        self.derivations
            .iter()
            .find(|derivation| derivation.name == name)
    }
}

/// Builder for `EntitySchema`; errors surface from `build`.
pub struct EntitySchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
    derivations: Vec<Derivation>,
}

impl EntitySchemaBuilder {
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn derivation(mut self, derivation: Derivation) -> Self {
        self.derivations.push(derivation);
        self
    }

    pub fn build(self) -> Result<EntitySchema, SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }

        let mut seen = BTreeSet::new();
        for spec in &self.fields {
            if spec.name.trim().is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(SchemaError::DuplicateField(spec.name.clone()));
            }
            if spec.element_rule.is_some() && spec.kind != FieldKind::Sequence {
                return Err(SchemaError::ElementRuleOnScalar(spec.name.clone()));
            }
        }

        let mut seen = BTreeSet::new();
        for derivation in &self.derivations {
            if derivation.name.trim().is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if !seen.insert(derivation.name.as_str()) {
                return Err(SchemaError::DuplicateDerivation(derivation.name.clone()));
            }
        }

        Ok(EntitySchema {
            name: self.name,
            fields: self.fields,
            derivations: self.derivations,
        })
    }
}
