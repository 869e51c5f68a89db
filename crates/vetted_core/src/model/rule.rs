//! Validation rules applied before any field mutation.
//!
//! # Responsibility
//! - Provide pure predicates over a candidate value and the current state.
//! - Describe why a candidate was rejected, without echoing the value.
//!
//! # Invariants
//! - Evaluating a rule never mutates entity state.
//! - Rules do not perform I/O.

use crate::model::entity::FieldView;
use crate::model::error::Rejection;
use crate::model::field::FieldValue;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

static NON_BLANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S").expect("valid non-blank regex"));

/// Caller-defined predicate over a candidate and the current field view.
pub type Predicate = Arc<dyn Fn(&FieldValue, &FieldView<'_>) -> bool + Send + Sync>;

/// Predicate a candidate value must satisfy.
#[derive(Clone)]
pub enum Rule {
    /// Accepts every value of the right kind.
    Any,
    /// Integer within `[lo, hi]`.
    Range { lo: i64, hi: i64 },
    /// Integer `>= lo`.
    AtLeast(i64),
    /// Integer `> 0`.
    Positive,
    /// Text with at least one non-whitespace character.
    NonBlank,
    /// Text matching the pattern somewhere.
    Matches(Regex),
    /// Uuid that is not nil.
    NotNil,
    /// Named caller-defined predicate.
    Custom(String, Predicate),
}

impl Rule {
    /// Builds a named custom rule from a closure.
    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FieldValue, &FieldView<'_>) -> bool + Send + Sync + 'static,
    {
        Self::Custom(name.into(), Arc::new(predicate))
    }

    /// Evaluates this rule for `field`.
    ///
    /// Returns a `Rejection` naming the field and the violated constraint.
    pub fn check(
        &self,
        field: &str,
        candidate: &FieldValue,
        view: &FieldView<'_>,
    ) -> Result<(), Rejection> {
        match self {
            Self::Any => Ok(()),
            Self::Range { lo, hi } => {
                let value = expect_int(field, candidate)?;
                if value < *lo || value > *hi {
                    return Err(Rejection::new(
                        field,
                        format!("value must be within [{lo}, {hi}]"),
                    ));
                }
                Ok(())
            }
            Self::AtLeast(lo) => {
                let value = expect_int(field, candidate)?;
                if value < *lo {
                    return Err(Rejection::new(field, format!("value must be >= {lo}")));
                }
                Ok(())
            }
            Self::Positive => {
                let value = expect_int(field, candidate)?;
                if value <= 0 {
                    return Err(Rejection::new(field, "value must be > 0"));
                }
                Ok(())
            }
            Self::NonBlank => {
                let text = expect_text(field, candidate)?;
                if !NON_BLANK_RE.is_match(text) {
                    return Err(Rejection::new(field, "text must not be blank"));
                }
                Ok(())
            }
            Self::Matches(pattern) => {
                let text = expect_text(field, candidate)?;
                if !pattern.is_match(text) {
                    return Err(Rejection::new(
                        field,
                        format!("text must match pattern `{}`", pattern.as_str()),
                    ));
                }
                Ok(())
            }
            Self::NotNil => match candidate {
                FieldValue::Id(id) if !id.is_nil() => Ok(()),
                FieldValue::Id(_) => Err(Rejection::new(field, "id must not be nil")),
                other => Err(kind_mismatch(field, "id", other)),
            },
            Self::Custom(name, predicate) => {
                if predicate(candidate, view) {
                    Ok(())
                } else {
                    Err(Rejection::new(field, format!("rule `{name}` rejected value")))
                }
            }
        }
    }
}

impl Debug for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "Any"),
            Self::Range { lo, hi } => write!(f, "Range {{ lo: {lo}, hi: {hi} }}"),
            Self::AtLeast(lo) => write!(f, "AtLeast({lo})"),
            Self::Positive => write!(f, "Positive"),
            Self::NonBlank => write!(f, "NonBlank"),
            Self::Matches(pattern) => write!(f, "Matches({:?})", pattern.as_str()),
            Self::NotNil => write!(f, "NotNil"),
            Self::Custom(name, _) => write!(f, "Custom({name:?})"),
        }
    }
}

fn expect_int(field: &str, candidate: &FieldValue) -> Result<i64, Rejection> {
    candidate
        .as_int()
        .ok_or_else(|| kind_mismatch(field, "int", candidate))
}

fn expect_text<'a>(field: &str, candidate: &'a FieldValue) -> Result<&'a str, Rejection> {
    candidate
        .as_text()
        .ok_or_else(|| kind_mismatch(field, "text", candidate))
}

fn kind_mismatch(field: &str, expected: &str, candidate: &FieldValue) -> Rejection {
    Rejection::new(
        field,
        format!(
            "expected {expected} value, got {}",
            candidate.kind().as_str()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::Rule;
    use crate::model::entity::FieldView;
    use crate::model::field::FieldValue;
    use regex::Regex;
    use uuid::Uuid;

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let view = FieldView::empty();
        let rule = Rule::Range { lo: 0, hi: 100 };
        assert!(rule.check("score", &FieldValue::Int(0), &view).is_ok());
        assert!(rule.check("score", &FieldValue::Int(100), &view).is_ok());

        let err = rule
            .check("score", &FieldValue::Int(101), &view)
            .expect_err("101 is out of range");
        assert_eq!(err.field(), "score");
        assert!(err.reason().contains("[0, 100]"));
        assert!(rule.check("score", &FieldValue::Int(-1), &view).is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        let view = FieldView::empty();
        assert!(Rule::Positive
            .check("amount", &FieldValue::Int(0), &view)
            .is_err());
        assert!(Rule::Positive
            .check("amount", &FieldValue::Int(1), &view)
            .is_ok());
    }

    #[test]
    fn numeric_rules_reject_wrong_kind() {
        let view = FieldView::empty();
        let err = Rule::AtLeast(0)
            .check("balance", &FieldValue::from("ten"), &view)
            .expect_err("text is not an int");
        assert_eq!(err.reason(), "expected int value, got text");
    }

    #[test]
    fn non_blank_and_pattern_rules_check_text() {
        let view = FieldView::empty();
        assert!(Rule::NonBlank
            .check("name", &FieldValue::from("  \t"), &view)
            .is_err());
        assert!(Rule::NonBlank
            .check("name", &FieldValue::from(" Ada "), &view)
            .is_ok());

        let rule = Rule::Matches(Regex::new(r"^[a-z]+$").unwrap());
        assert!(rule.check("slug", &FieldValue::from("abc"), &view).is_ok());
        let err = rule
            .check("slug", &FieldValue::from("ABC"), &view)
            .expect_err("uppercase does not match");
        assert!(err.reason().contains("^[a-z]+$"));
    }

    #[test]
    fn not_nil_rejects_nil_uuid() {
        let view = FieldView::empty();
        assert!(Rule::NotNil
            .check("id", &FieldValue::Id(Uuid::nil()), &view)
            .is_err());
        assert!(Rule::NotNil
            .check("id", &FieldValue::Id(Uuid::new_v4()), &view)
            .is_ok());
    }

    #[test]
    fn custom_rule_reports_its_name() {
        let view = FieldView::empty();
        let rule = Rule::custom("even", |value, _| value.as_int().is_some_and(|v| v % 2 == 0));
        assert!(rule.check("n", &FieldValue::Int(4), &view).is_ok());
        let err = rule
            .check("n", &FieldValue::Int(3), &view)
            .expect_err("odd is rejected");
        assert_eq!(err.reason(), "rule `even` rejected value");
        assert_eq!(format!("{rule:?}"), "Custom(\"even\")");
    }
}
