//! Core configuration.
//!
//! # Responsibility
//! - Carry the defaults callers apply when creating entities.
//! - Validate settings before they reach entity constructors or logging.
//!
//! # Invariants
//! - Missing keys fall back to defaults; unknown keys are rejected.

use crate::logging::{default_log_level, normalize_level};
use crate::model::account::AccountOptions;
use crate::model::policy::RejectPolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Process-wide defaults for entity creation and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Reject policy given to newly created entities.
    pub reject_policy: RejectPolicy,
    /// Overdraft limit for new accounts, in cents.
    pub overdraft_limit_cents: i64,
    /// `trace|debug|info|warn|error`.
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            reject_policy: RejectPolicy::default(),
            overdraft_limit_cents: 0,
            log_level: default_log_level().to_string(),
        }
    }
}

/// Configuration parse/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    NegativeOverdraftLimit(i64),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::NegativeOverdraftLimit(value) => {
                write!(f, "overdraft_limit_cents must be >= 0, got {value}")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::NegativeOverdraftLimit(_) => None,
            Self::InvalidLogLevel(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.overdraft_limit_cents < 0 {
            return Err(ConfigError::NegativeOverdraftLimit(
                self.overdraft_limit_cents,
            ));
        }
        normalize_level(self.log_level.as_str()).map_err(ConfigError::InvalidLogLevel)?;
        Ok(())
    }

    /// Options for `Account::open` derived from this config.
    pub fn account_options(&self) -> AccountOptions {
        AccountOptions {
            overdraft_limit_cents: self.overdraft_limit_cents,
            policy: self.reject_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::model::policy::RejectPolicy;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("defaults are valid");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.reject_policy, RejectPolicy::Signal);
    }

    #[test]
    fn parses_all_fields() {
        let config = CoreConfig::from_json_str(
            r#"{"reject_policy":"silent","overdraft_limit_cents":500,"log_level":"warn"}"#,
        )
        .expect("valid config");
        let options = config.account_options();
        assert_eq!(options.policy, RejectPolicy::Silent);
        assert_eq!(options.overdraft_limit_cents, 500);
    }

    #[test]
    fn rejects_negative_overdraft_limit() {
        let err = CoreConfig::from_json_str(r#"{"overdraft_limit_cents":-1}"#)
            .expect_err("negative limit must fail");
        assert!(matches!(err, ConfigError::NegativeOverdraftLimit(-1)));
    }

    #[test]
    fn rejects_unknown_log_level_and_keys() {
        let err = CoreConfig::from_json_str(r#"{"log_level":"verbose"}"#)
            .expect_err("unknown level must fail");
        assert!(err.to_string().contains("unsupported log level"));

        let err = CoreConfig::from_json_str(r#"{"colour":"blue"}"#)
            .expect_err("unknown key must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
