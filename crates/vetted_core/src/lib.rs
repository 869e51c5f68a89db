//! Validated-state entities.
//! Entity fields are private; every write runs a rule before it lands.

pub mod config;
pub mod logging;
pub mod model;
pub mod shared;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::account::{Account, AccountId, AccountOptions};
pub use model::entity::{FieldView, ValidatedEntity};
pub use model::error::{EntityError, Rejection, SchemaError};
pub use model::field::{FieldAccess, FieldKind, FieldSpec, FieldValue};
pub use model::person::Person;
pub use model::policy::{MutationOutcome, RejectPolicy};
pub use model::rule::Rule;
pub use model::schema::{Derivation, EntitySchema};
pub use model::student::Student;
pub use shared::Shared;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
