//! Graded entity: a named student with an ordered list of scores.

use crate::model::entity::ValidatedEntity;
use crate::model::error::EntityError;
use crate::model::field::{FieldAccess, FieldKind, FieldSpec, FieldValue};
use crate::model::policy::{MutationOutcome, RejectPolicy};
use crate::model::rule::Rule;
use crate::model::schema::{Derivation, EntitySchema};
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const STUDENT_NAME_FIELD: &str = "name";
pub const STUDENT_SCORES_FIELD: &str = "scores";
pub const STUDENT_AVERAGE: &str = "average";

/// Inclusive bounds of a single score.
pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

static STUDENT_SCHEMA: Lazy<Arc<EntitySchema>> = Lazy::new(|| {
    Arc::new(
        EntitySchema::builder("student")
            .field(
                FieldSpec::new(
                    STUDENT_NAME_FIELD,
                    FieldAccess::ReadWriteValidated,
                    FieldKind::Text,
                )
                .with_rule(Rule::NonBlank),
            )
            .field(
                FieldSpec::new(
                    STUDENT_SCORES_FIELD,
                    FieldAccess::ReadWriteValidated,
                    FieldKind::Sequence,
                )
                .with_element_rule(Rule::Range {
                    lo: MIN_SCORE,
                    hi: MAX_SCORE,
                }),
            )
            .derivation(Derivation::mean(STUDENT_AVERAGE, STUDENT_SCORES_FIELD))
            .build()
            .expect("valid student schema"),
    )
});

/// Student whose scores can only grow through validated appends.
#[derive(Debug, Clone)]
pub struct Student {
    entity: ValidatedEntity,
}

impl Student {
    /// Creates a student with no scores.
    pub fn new(name: impl Into<String>, policy: RejectPolicy) -> Result<Self, EntityError> {
        Self::with_scores(name, Vec::new(), policy)
    }

    /// Creates a student with existing scores, each within `[0, 100]`.
    pub fn with_scores(
        name: impl Into<String>,
        scores: Vec<i64>,
        policy: RejectPolicy,
    ) -> Result<Self, EntityError> {
        let entity = ValidatedEntity::construct(
            Arc::clone(&STUDENT_SCHEMA),
            [
                (STUDENT_NAME_FIELD, FieldValue::Text(name.into())),
                (STUDENT_SCORES_FIELD, FieldValue::Sequence(scores)),
            ],
            policy,
        )?;
        Ok(Self { entity })
    }

    pub fn name(&self) -> String {
        self.entity
            .internal(STUDENT_NAME_FIELD)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string()
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<MutationOutcome, EntityError> {
        self.entity
            .mutate(STUDENT_NAME_FIELD, FieldValue::Text(name.into()))
    }

    /// Copy of the recorded scores, oldest first.
    pub fn scores(&self) -> Vec<i64> {
        self.entity
            .internal(STUDENT_SCORES_FIELD)
            .and_then(FieldValue::as_sequence)
            .unwrap_or_default()
            .to_vec()
    }

    pub fn add_score(&mut self, score: i64) -> Result<MutationOutcome, EntityError> {
        self.entity.append_to_sequence(STUDENT_SCORES_FIELD, score)
    }

    /// Mean of all scores, `0.0` when none are recorded.
    pub fn average(&self) -> f64 {
        self.entity.derive(STUDENT_AVERAGE)
    }

    pub fn entity(&self) -> &ValidatedEntity {
        &self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::Student;
    use crate::model::error::EntityError;
    use crate::model::policy::{MutationOutcome, RejectPolicy};

    #[test]
    fn rejects_blank_name() {
        let err = Student::new("   ", RejectPolicy::Signal).expect_err("blank name");
        assert!(matches!(err, EntityError::InvalidInitialState(_)));
    }

    #[test]
    fn rejects_out_of_range_initial_scores() {
        assert!(Student::with_scores("Ada", vec![90, 101], RejectPolicy::Silent).is_err());
        assert!(Student::with_scores("Ada", vec![-1], RejectPolicy::Silent).is_err());
    }

    #[test]
    fn score_bounds_are_inclusive() {
        let mut student = Student::new("Ada", RejectPolicy::Signal).unwrap();
        assert_eq!(student.add_score(0), Ok(MutationOutcome::Applied));
        assert_eq!(student.add_score(100), Ok(MutationOutcome::Applied));
        assert!(student.add_score(101).is_err());
        assert!(student.add_score(-1).is_err());
        assert_eq!(student.scores(), vec![0, 100]);
        assert_eq!(student.average(), 50.0);
    }

    #[test]
    fn scores_returns_a_defensive_copy() {
        let mut student = Student::with_scores("Ada", vec![70], RejectPolicy::Signal).unwrap();
        let mut copy = student.scores();
        copy.push(100);
        copy[0] = 0;
        assert_eq!(student.scores(), vec![70]);

        student.add_score(90).unwrap();
        assert_eq!(copy, vec![0, 100]);
    }

    #[test]
    fn rename_validates_new_name() {
        let mut student = Student::new("Ada", RejectPolicy::Silent).unwrap();
        assert_eq!(student.rename(""), Ok(MutationOutcome::Ignored));
        assert_eq!(student.name(), "Ada");
        assert_eq!(student.rename("Grace"), Ok(MutationOutcome::Applied));
        assert_eq!(student.name(), "Grace");
    }
}
