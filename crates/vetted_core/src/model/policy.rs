//! Reject-signaling policy for failed mutations.

use serde::{Deserialize, Serialize};

/// How an entity reports a mutation that fails validation.
///
/// State is left unchanged under both policies; only the caller-visible
/// result differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectPolicy {
    /// Return `Ok(MutationOutcome::Ignored)`.
    Silent,
    /// Return `Err(EntityError::ValidationRejected)`.
    #[default]
    Signal,
}

impl RejectPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Signal => "signal",
        }
    }
}

/// Result of a mutation that did not raise an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// Rejected and swallowed under `RejectPolicy::Silent`.
    Ignored,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::{MutationOutcome, RejectPolicy};

    #[test]
    fn default_policy_signals_rejections() {
        assert_eq!(RejectPolicy::default(), RejectPolicy::Signal);
    }

    #[test]
    fn policy_uses_lowercase_wire_names() {
        assert_eq!(
            serde_json::to_value(RejectPolicy::Silent).unwrap(),
            RejectPolicy::Silent.as_str()
        );
        let decoded: RejectPolicy = serde_json::from_str("\"signal\"").unwrap();
        assert_eq!(decoded, RejectPolicy::Signal);
    }

    #[test]
    fn only_applied_reports_applied() {
        assert!(MutationOutcome::Applied.is_applied());
        assert!(!MutationOutcome::Ignored.is_applied());
    }
}
