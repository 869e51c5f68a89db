//! Person entity with plain getter/setter pairs.

use crate::model::entity::ValidatedEntity;
use crate::model::error::EntityError;
use crate::model::field::{FieldAccess, FieldKind, FieldSpec, FieldValue};
use crate::model::policy::{MutationOutcome, RejectPolicy};
use crate::model::rule::Rule;
use crate::model::schema::EntitySchema;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

pub const PERSON_NAME_FIELD: &str = "name";
pub const PERSON_AGE_FIELD: &str = "age";
pub const MAX_AGE: i64 = 150;

static PERSON_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S").expect("valid person name regex"));

static PERSON_SCHEMA: Lazy<Arc<EntitySchema>> = Lazy::new(|| {
    Arc::new(
        EntitySchema::builder("person")
            .field(
                FieldSpec::new(
                    PERSON_NAME_FIELD,
                    FieldAccess::ReadWriteValidated,
                    FieldKind::Text,
                )
                .with_rule(Rule::Matches(PERSON_NAME_RE.clone())),
            )
            .field(
                FieldSpec::new(
                    PERSON_AGE_FIELD,
                    FieldAccess::ReadWriteValidated,
                    FieldKind::Int,
                )
                .with_rule(Rule::Range {
                    lo: 0,
                    hi: MAX_AGE,
                }),
            )
            .build()
            .expect("valid person schema"),
    )
});

#[derive(Debug, Clone)]
pub struct Person {
    entity: ValidatedEntity,
}

impl Person {
    pub fn new(
        name: impl Into<String>,
        age: i64,
        policy: RejectPolicy,
    ) -> Result<Self, EntityError> {
        let entity = ValidatedEntity::construct(
            Arc::clone(&PERSON_SCHEMA),
            [
                (PERSON_NAME_FIELD, FieldValue::Text(name.into())),
                (PERSON_AGE_FIELD, FieldValue::Int(age)),
            ],
            policy,
        )?;
        Ok(Self { entity })
    }

    pub fn name(&self) -> String {
        self.entity
            .internal(PERSON_NAME_FIELD)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string()
    }

    pub fn age(&self) -> i64 {
        self.entity
            .internal(PERSON_AGE_FIELD)
            .and_then(FieldValue::as_int)
            .unwrap_or(0)
    }

    /// Name must contain at least one non-whitespace character.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<MutationOutcome, EntityError> {
        self.entity
            .mutate(PERSON_NAME_FIELD, FieldValue::Text(name.into()))
    }

    /// Age must be within `[0, 150]`.
    pub fn set_age(&mut self, age: i64) -> Result<MutationOutcome, EntityError> {
        self.entity.mutate(PERSON_AGE_FIELD, FieldValue::Int(age))
    }

    pub fn entity(&self) -> &ValidatedEntity {
        &self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::Person;
    use crate::model::policy::{MutationOutcome, RejectPolicy};

    #[test]
    fn getters_return_constructor_values() {
        let person = Person::new("Zoë O'Neil", 34, RejectPolicy::Signal).unwrap();
        assert_eq!(person.name(), "Zoë O'Neil");
        assert_eq!(person.age(), 34);
    }

    #[test]
    fn set_age_enforces_bounds() {
        let mut person = Person::new("Ada", 36, RejectPolicy::Silent).unwrap();
        assert_eq!(person.set_age(-1), Ok(MutationOutcome::Ignored));
        assert_eq!(person.set_age(151), Ok(MutationOutcome::Ignored));
        assert_eq!(person.age(), 36);
        assert_eq!(person.set_age(150), Ok(MutationOutcome::Applied));
        assert_eq!(person.age(), 150);
    }

    #[test]
    fn set_name_rejects_blank_names() {
        let mut person = Person::new("Ada", 36, RejectPolicy::Signal).unwrap();
        let err = person.set_name(" \t ").expect_err("blank is not a name");
        assert_eq!(err.rejection().map(|r| r.field()), Some("name"));
        assert_eq!(person.name(), "Ada");
        person.set_name("Ada Lovelace").unwrap();
        assert_eq!(person.name(), "Ada Lovelace");
    }

    #[test]
    fn any_non_blank_name_is_accepted() {
        for name in ["Ada2", "_x", "42", "  padded  "] {
            let person = Person::new(name, 30, RejectPolicy::Signal)
                .unwrap_or_else(|err| panic!("{name:?} should be accepted: {err}"));
            assert_eq!(person.name(), name);
        }
        assert!(Person::new("", 30, RejectPolicy::Signal).is_err());
    }

    #[test]
    fn constructor_rejects_invalid_age() {
        assert!(Person::new("Ada", 200, RejectPolicy::Silent).is_err());
    }
}
