//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `vetted_core` linkage with a deterministic run of the account
//!   and student scenarios.

use vetted_core::{Account, CoreConfig, EntityError, MutationOutcome, Student};

fn describe(result: &Result<MutationOutcome, EntityError>) -> String {
    match result {
        Ok(MutationOutcome::Applied) => "applied".to_string(),
        Ok(MutationOutcome::Ignored) => "ignored".to_string(),
        Err(err) => format!("rejected ({err})"),
    }
}

/// Runs both scenarios with the policy from `config` and returns the report.
fn scenario_report(config: &CoreConfig) -> Result<Vec<String>, EntityError> {
    let mut lines = vec![
        format!("vetted_core version={}", vetted_core::core_version()),
        format!("reject_policy={}", config.reject_policy.as_str()),
    ];

    let mut account = Account::open(0, &config.account_options())?;
    lines.push(format!("account deposit 50: {}", describe(&account.deposit(50))));
    lines.push(format!(
        "account withdraw 100: {}",
        describe(&account.withdraw(100))
    ));
    lines.push(format!("account withdraw 30: {}", describe(&account.withdraw(30))));
    lines.push(format!("account balance={}", account.balance()));

    let mut student = Student::new("Ada", config.reject_policy)?;
    lines.push(format!("student average={}", student.average()));
    for score in [105, 80, 60] {
        lines.push(format!(
            "student add {score}: {}",
            describe(&student.add_score(score))
        ));
    }
    lines.push(format!(
        "student scores={:?} average={}",
        student.scores(),
        student.average()
    ));
    Ok(lines)
}

fn main() {
    // Why: keep a tiny CLI check that validates core crate wiring without any
    // configuration or logging setup.
    match scenario_report(&CoreConfig::default()) {
        Ok(lines) => lines.iter().for_each(|line| println!("{line}")),
        Err(err) => {
            eprintln!("vetted_cli error: {err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scenario_report;
    use vetted_core::{CoreConfig, RejectPolicy};

    fn config(policy: RejectPolicy) -> CoreConfig {
        CoreConfig {
            reject_policy: policy,
            ..CoreConfig::default()
        }
    }

    #[test]
    fn both_scenarios_follow_configured_silent_policy() {
        let lines = scenario_report(&config(RejectPolicy::Silent)).expect("scenarios run");
        assert!(lines.contains(&"account withdraw 100: ignored".to_string()));
        assert!(lines.contains(&"student add 105: ignored".to_string()));
        assert!(lines.contains(&"account balance=20".to_string()));
        assert!(lines.contains(&"student scores=[80, 60] average=70".to_string()));
    }

    #[test]
    fn both_scenarios_follow_configured_signal_policy() {
        let lines = scenario_report(&config(RejectPolicy::Signal)).expect("scenarios run");
        assert!(lines
            .iter()
            .any(|line| line.starts_with("account withdraw 100: rejected")));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("student add 105: rejected")));
    }
}
