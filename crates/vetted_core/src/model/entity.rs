//! Validated entity: private state behind rule-checked accessors.
//!
//! # Responsibility
//! - Hold field values privately and expose read access by field name.
//! - Route every write through the field's rule before touching state.
//! - Report rejected writes according to the entity's `RejectPolicy`.
//!
//! # Invariants
//! - An entity is valid from construction onwards; construction fails fast.
//! - Rules run before any write; a rejected write leaves state unchanged.
//! - `read` returns owned copies, never references into storage.
//! - `InternalOnly` fields are not observable through the public API.

use crate::model::error::{EntityError, Rejection};
use crate::model::field::{FieldKind, FieldSpec, FieldValue};
use crate::model::policy::{MutationOutcome, RejectPolicy};
use crate::model::schema::EntitySchema;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Borrowed read-only view of an entity's fields, handed to rules and
/// derivations.
///
/// Includes internal fields, so rules can depend on hidden state. The view
/// cannot outlive the evaluation that received it.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    specs: &'a [FieldSpec],
    values: &'a [FieldValue],
}

impl<'a> FieldView<'a> {
    /// View with no fields. Useful for evaluating stateless rules.
    pub fn empty() -> Self {
        Self {
            specs: &[],
            values: &[],
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a FieldValue> {
        self.specs
            .iter()
            .position(|spec| spec.name() == name)
            .and_then(|index| self.values.get(index))
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_int)
    }

    pub fn sequence(&self, name: &str) -> Option<&'a [i64]> {
        self.get(name).and_then(FieldValue::as_sequence)
    }
}

/// Record whose writes are validated before they are applied.
#[derive(Debug, Clone)]
pub struct ValidatedEntity {
    schema: Arc<EntitySchema>,
    values: Vec<FieldValue>,
    policy: RejectPolicy,
}

impl ValidatedEntity {
    /// Builds an entity from initial field values.
    ///
    /// Every declared field must be supplied and must satisfy its rule.
    ///
    /// # Errors
    /// - `InvalidInitialState` listing every missing, undeclared, mistyped
    ///   or rule-breaking value.
    pub fn construct<I, K>(
        schema: Arc<EntitySchema>,
        initial: I,
        policy: RejectPolicy,
    ) -> Result<Self, EntityError>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let mut provided: BTreeMap<String, FieldValue> = initial
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();

        let mut rejections = Vec::new();
        let mut values = Vec::with_capacity(schema.fields().len());
        for spec in schema.fields() {
            match provided.remove(spec.name()) {
                None => rejections.push(Rejection::new(spec.name(), "value is required")),
                Some(value) if value.kind() != spec.kind() => rejections.push(Rejection::new(
                    spec.name(),
                    format!(
                        "expected {} value, got {}",
                        spec.kind().as_str(),
                        value.kind().as_str()
                    ),
                )),
                Some(value) => values.push(value),
            }
        }
        for name in provided.into_keys() {
            rejections.push(Rejection::new(name, "field is not declared"));
        }

        // Why: rules may read sibling fields through the view, so they only
        // run once every field is present with its declared kind. Siblings
        // can still break their own rules, which cross-field rules must
        // tolerate.
        if rejections.is_empty() {
            let view = FieldView {
                specs: schema.fields(),
                values: values.as_slice(),
            };
            for (spec, value) in schema.fields().iter().zip(values.iter()) {
                if let Err(rejection) = check_value(spec, value, &view) {
                    rejections.push(rejection);
                }
            }
        }

        if !rejections.is_empty() {
            warn!(
                "event=entity_construct module=entity status=rejected entity={} rejections={}",
                schema.name(),
                rejections.len()
            );
            return Err(EntityError::InvalidInitialState(rejections));
        }

        debug!(
            "event=entity_construct module=entity status=ok entity={} policy={}",
            schema.name(),
            policy.as_str()
        );
        Ok(Self {
            schema,
            values,
            policy,
        })
    }

    pub fn schema(&self) -> &EntitySchema {
        self.schema.as_ref()
    }

    pub fn policy(&self) -> RejectPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: RejectPolicy) {
        self.policy = policy;
    }

    /// Names of all fields accepted by `read`, in schema order.
    pub fn readable_fields(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .filter(|spec| spec.access().is_readable())
            .map(FieldSpec::name)
            .collect()
    }

    /// Returns a copy of a readable field's current value.
    ///
    /// # Errors
    /// - `UnknownField` when the schema does not declare `field`.
    /// - `NotReadable` for `InternalOnly` fields.
    pub fn read(&self, field: &str) -> Result<FieldValue, EntityError> {
        let index = self.index_of(field)?;
        if !self.schema.fields()[index].access().is_readable() {
            return Err(EntityError::NotReadable(field.to_string()));
        }
        Ok(self.values[index].clone())
    }

    /// Replaces a field value after validating it.
    ///
    /// On rejection state is unchanged; the result follows `policy()`.
    ///
    /// # Errors
    /// - `UnknownField` / `NotWritable` regardless of policy.
    /// - `ValidationRejected` under `RejectPolicy::Signal`.
    pub fn mutate(
        &mut self,
        field: &str,
        new_value: impl Into<FieldValue>,
    ) -> Result<MutationOutcome, EntityError> {
        let new_value = new_value.into();
        self.mutate_with(field, move |_, _| Ok(new_value))
    }

    /// Applies a state-dependent transition to one field.
    ///
    /// `transition` computes the candidate from the current value and a view
    /// of the entity; it may reject on its own. The field rule is then
    /// applied to the candidate before anything is written.
    pub fn mutate_with<F>(
        &mut self,
        field: &str,
        transition: F,
    ) -> Result<MutationOutcome, EntityError>
    where
        F: FnOnce(&FieldValue, &FieldView<'_>) -> Result<FieldValue, Rejection>,
    {
        let index = self.writable_index(field)?;
        let view = self.view();
        let spec = &self.schema.fields()[index];
        let checked = transition(&self.values[index], &view)
            .and_then(|candidate| check_value(spec, &candidate, &view).map(|()| candidate));

        match checked {
            Ok(candidate) => {
                self.values[index] = candidate;
                debug!(
                    "event=field_mutate module=entity status=ok entity={} field={}",
                    self.schema.name(),
                    field
                );
                Ok(MutationOutcome::Applied)
            }
            Err(rejection) => self.reject(rejection),
        }
    }

    /// Appends one element to a sequence field after validating it.
    ///
    /// # Errors
    /// - `UnknownField` / `NotWritable` / `NotASequence` regardless of policy.
    /// - `ValidationRejected` under `RejectPolicy::Signal`.
    pub fn append_to_sequence(
        &mut self,
        field: &str,
        value: i64,
    ) -> Result<MutationOutcome, EntityError> {
        let index = self.writable_index(field)?;
        if self.schema.fields()[index].kind() != FieldKind::Sequence {
            return Err(EntityError::NotASequence(field.to_string()));
        }

        self.mutate_with(field, |current, _| {
            let mut candidate = current.as_sequence().unwrap_or_default().to_vec();
            candidate.push(value);
            Ok(FieldValue::Sequence(candidate))
        })
    }

    /// Evaluates a registered derivation; never fails.
    ///
    /// Unknown derivation names yield `0.0`.
    pub fn derive(&self, name: &str) -> f64 {
        match self.schema.derivation(name) {
            Some(derivation) => derivation.evaluate(&self.view()),
            None => {
                warn!(
                    "event=entity_derive module=entity status=unknown entity={} derivation={}",
                    self.schema.name(),
                    name
                );
                0.0
            }
        }
    }

    /// Raw access for the owning fixture type, including internal fields.
    pub(crate) fn internal(&self, field: &str) -> Option<&FieldValue> {
        self.schema
            .field_index(field)
            .and_then(|index| self.values.get(index))
    }

    fn view(&self) -> FieldView<'_> {
        FieldView {
            specs: self.schema.fields(),
            values: self.values.as_slice(),
        }
    }

    fn index_of(&self, field: &str) -> Result<usize, EntityError> {
        self.schema
            .field_index(field)
            .ok_or_else(|| EntityError::UnknownField(field.to_string()))
    }

    fn writable_index(&self, field: &str) -> Result<usize, EntityError> {
        let index = self.index_of(field)?;
        if !self.schema.fields()[index].access().is_writable() {
            return Err(EntityError::NotWritable(field.to_string()));
        }
        Ok(index)
    }

    fn reject(&self, rejection: Rejection) -> Result<MutationOutcome, EntityError> {
        debug!(
            "event=field_mutate module=entity status=rejected entity={} field={} policy={} reason={}",
            self.schema.name(),
            rejection.field(),
            self.policy.as_str(),
            rejection.reason()
        );
        match self.policy {
            RejectPolicy::Silent => Ok(MutationOutcome::Ignored),
            RejectPolicy::Signal => Err(EntityError::ValidationRejected(rejection)),
        }
    }
}

fn check_value(
    spec: &FieldSpec,
    candidate: &FieldValue,
    view: &FieldView<'_>,
) -> Result<(), Rejection> {
    if candidate.kind() != spec.kind() {
        return Err(Rejection::new(
            spec.name(),
            format!(
                "expected {} value, got {}",
                spec.kind().as_str(),
                candidate.kind().as_str()
            ),
        ));
    }

    spec.rule.check(spec.name(), candidate, view)?;

    if let (Some(element_rule), Some(elements)) = (&spec.element_rule, candidate.as_sequence()) {
        for element in elements {
            element_rule.check(spec.name(), &FieldValue::Int(*element), view)?;
        }
    }
    Ok(())
}
