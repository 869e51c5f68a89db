//! Validated-entity model.
//!
//! # Responsibility
//! - Define the generic `ValidatedEntity` with its schema, rules and policy.
//! - Provide typed entities (account, student, person) built on top of it.
//!
//! # Invariants
//! - Entity storage is private; every write goes through a rule check.
//! - Accessors hand out copies, never references to internal containers.

pub mod account;
pub mod entity;
pub mod error;
pub mod field;
pub mod person;
pub mod policy;
pub mod rule;
pub mod schema;
pub mod student;
