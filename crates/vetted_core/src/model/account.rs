//! Account-balance entity.
//!
//! # Responsibility
//! - Keep a balance that only changes through deposits and withdrawals.
//! - Hide the overdraft limit; it shapes validation but is never readable.
//!
//! # Invariants
//! - `id` is fixed at open time and never nil.
//! - `balance >= -overdraft_limit` at all times.
//! - Deposit and withdrawal amounts are strictly positive.

use crate::model::entity::ValidatedEntity;
use crate::model::error::{EntityError, Rejection};
use crate::model::field::{FieldAccess, FieldKind, FieldSpec, FieldValue};
use crate::model::policy::{MutationOutcome, RejectPolicy};
use crate::model::rule::Rule;
use crate::model::schema::EntitySchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Stable identifier of an account.
pub type AccountId = Uuid;

pub const ACCOUNT_ID_FIELD: &str = "id";
pub const ACCOUNT_BALANCE_FIELD: &str = "balance";
const OVERDRAFT_LIMIT_FIELD: &str = "overdraft_limit";

static ACCOUNT_SCHEMA: Lazy<Arc<EntitySchema>> = Lazy::new(|| {
    Arc::new(
        EntitySchema::builder("account")
            .field(
                FieldSpec::new(ACCOUNT_ID_FIELD, FieldAccess::ReadOnly, FieldKind::Id)
                    .with_rule(Rule::NotNil),
            )
            .field(
                FieldSpec::new(
                    ACCOUNT_BALANCE_FIELD,
                    FieldAccess::ReadWriteValidated,
                    FieldKind::Int,
                )
                .with_rule(Rule::custom("within_overdraft_limit", |value, view| {
                    // Why: at construction the limit has not passed its own
                    // rule yet; a negative or `i64::MIN` limit must reject
                    // here instead of overflowing on negation.
                    let floor = view
                        .int(OVERDRAFT_LIMIT_FIELD)
                        .filter(|limit| *limit >= 0)
                        .and_then(i64::checked_neg);
                    match (value.as_int(), floor) {
                        (Some(balance), Some(floor)) => balance >= floor,
                        _ => false,
                    }
                })),
            )
            .field(
                FieldSpec::new(
                    OVERDRAFT_LIMIT_FIELD,
                    FieldAccess::InternalOnly,
                    FieldKind::Int,
                )
                .with_rule(Rule::AtLeast(0)),
            )
            .build()
            .expect("valid account schema")
    )
});

/// Options applied when opening an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountOptions {
    /// How far below zero the balance may go, in minor units. `0` disables
    /// overdraft.
    pub overdraft_limit_cents: i64,
    pub policy: RejectPolicy,
}

/// Bank account whose balance is held in minor currency units (cents).
#[derive(Debug, Clone)]
pub struct Account {
    entity: ValidatedEntity,
}

impl Account {
    /// Opens an account with a generated id.
    pub fn open(initial_cents: i64, options: &AccountOptions) -> Result<Self, EntityError> {
        Self::with_id(Uuid::new_v4(), initial_cents, options)
    }

    /// Opens an account with a caller-provided id.
    ///
    /// # Errors
    /// - `InvalidInitialState` for a nil id, a negative overdraft limit, or an
    ///   initial balance below `-overdraft_limit_cents`.
    pub fn with_id(
        id: AccountId,
        initial_cents: i64,
        options: &AccountOptions,
    ) -> Result<Self, EntityError> {
        let entity = ValidatedEntity::construct(
            Arc::clone(&ACCOUNT_SCHEMA),
            [
                (ACCOUNT_ID_FIELD, FieldValue::Id(id)),
                (ACCOUNT_BALANCE_FIELD, FieldValue::Int(initial_cents)),
                (
                    OVERDRAFT_LIMIT_FIELD,
                    FieldValue::Int(options.overdraft_limit_cents),
                ),
            ],
            options.policy,
        )?;
        Ok(Self { entity })
    }

    pub fn id(&self) -> AccountId {
        self.entity
            .internal(ACCOUNT_ID_FIELD)
            .and_then(FieldValue::as_id)
            .unwrap_or_default()
    }

    /// Current balance in cents.
    pub fn balance(&self) -> i64 {
        self.int_field(ACCOUNT_BALANCE_FIELD)
    }

    /// Funds a withdrawal may take right now, overdraft included.
    pub fn available(&self) -> i64 {
        // Why: a large opening balance plus a large limit can exceed
        // `i64::MAX`; clamping only caps what a withdrawal may request.
        self.balance()
            .saturating_add(self.int_field(OVERDRAFT_LIMIT_FIELD))
    }

    /// Adds `amount` cents to the balance.
    pub fn deposit(&mut self, amount: i64) -> Result<MutationOutcome, EntityError> {
        self.entity
            .mutate_with(ACCOUNT_BALANCE_FIELD, |current, _| {
                if amount <= 0 {
                    return Err(Rejection::new(
                        ACCOUNT_BALANCE_FIELD,
                        "deposit amount must be > 0",
                    ));
                }
                current
                    .as_int()
                    .and_then(|balance| balance.checked_add(amount))
                    .map(FieldValue::Int)
                    .ok_or_else(|| Rejection::new(ACCOUNT_BALANCE_FIELD, "balance would overflow"))
            })
    }

    /// Takes `amount` cents from the balance.
    ///
    /// Accepted only when `0 < amount <= available()`.
    pub fn withdraw(&mut self, amount: i64) -> Result<MutationOutcome, EntityError> {
        let available = self.available();
        self.entity
            .mutate_with(ACCOUNT_BALANCE_FIELD, |current, _| {
                if amount <= 0 {
                    return Err(Rejection::new(
                        ACCOUNT_BALANCE_FIELD,
                        "withdrawal amount must be > 0",
                    ));
                }
                if amount > available {
                    return Err(Rejection::new(
                        ACCOUNT_BALANCE_FIELD,
                        "withdrawal exceeds available funds",
                    ));
                }
                current
                    .as_int()
                    .and_then(|balance| balance.checked_sub(amount))
                    .map(FieldValue::Int)
                    .ok_or_else(|| Rejection::new(ACCOUNT_BALANCE_FIELD, "balance would overflow"))
            })
    }

    pub fn policy(&self) -> RejectPolicy {
        self.entity.policy()
    }

    pub fn set_policy(&mut self, policy: RejectPolicy) {
        self.entity.set_policy(policy);
    }

    /// Read-only access to the underlying entity.
    pub fn entity(&self) -> &ValidatedEntity {
        &self.entity
    }

    fn int_field(&self, field: &str) -> i64 {
        self.entity
            .internal(field)
            .and_then(FieldValue::as_int)
            .unwrap_or(0)
    }
}
