//! Suite and step outcomes

use proyecto_types::Store;
use serde::Serialize;

/// Result of a single numbered step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed(String),
    /// Not run because an earlier step in the chain failed
    Skipped,
}

/// One recorded step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    /// 1-based position in the suite's plan
    pub index: usize,
    pub name: String,
    #[serde(flatten)]
    pub status: StepStatus,
    pub elapsed_ms: u64,
}

impl StepOutcome {
    pub fn is_passed(&self) -> bool {
        self.status == StepStatus::Passed
    }
}

/// Passed/failed/skipped tallies of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepCounts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Everything that happened to one store during a run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub store: Store,
    /// Connection or pre-step failure; no step ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_error: Option<String>,
    pub steps: Vec<StepOutcome>,
    /// Cleanup, residue check or release failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teardown_error: Option<String>,
    pub elapsed_ms: u64,
}

impl SuiteReport {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            setup_error: None,
            steps: Vec::new(),
            teardown_error: None,
            elapsed_ms: 0,
        }
    }

    /// Report for a suite that never got a connection
    pub fn setup_failed(store: Store, error: impl ToString) -> Self {
        Self {
            setup_error: Some(error.to_string()),
            ..Self::new(store)
        }
    }

    /// True when setup, every step and teardown succeeded
    pub fn passed(&self) -> bool {
        self.setup_error.is_none()
            && self.teardown_error.is_none()
            && !self.steps.is_empty()
            && self.steps.iter().all(StepOutcome::is_passed)
    }

    pub fn counts(&self) -> StepCounts {
        self.steps
            .iter()
            .fold(StepCounts::default(), |mut counts, step| {
                match step.status {
                    StepStatus::Passed => counts.passed += 1,
                    StepStatus::Failed(_) => counts.failed += 1,
                    StepStatus::Skipped => counts.skipped += 1,
                }
                counts
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: usize, status: StepStatus) -> StepOutcome {
        StepOutcome {
            index,
            name: format!("step {}", index),
            status,
            elapsed_ms: 1,
        }
    }

    #[test]
    fn test_all_passed() {
        let mut report = SuiteReport::new(Store::Mysql);
        report.steps = vec![
            outcome(1, StepStatus::Passed),
            outcome(2, StepStatus::Passed),
        ];
        assert!(report.passed());
        assert_eq!(
            report.counts(),
            StepCounts {
                passed: 2,
                failed: 0,
                skipped: 0
            }
        );
    }

    #[test]
    fn test_empty_report_does_not_pass() {
        assert!(!SuiteReport::new(Store::Redis).passed());
    }

    #[test]
    fn test_teardown_failure_fails_report() {
        let mut report = SuiteReport::new(Store::Postgres);
        report.steps = vec![outcome(1, StepStatus::Passed)];
        report.teardown_error = Some("2 fixture rows left behind".into());
        assert!(!report.passed());
    }

    #[test]
    fn test_counts() {
        let mut report = SuiteReport::new(Store::Mongodb);
        report.steps = vec![
            outcome(1, StepStatus::Passed),
            outcome(2, StepStatus::Failed("boom".into())),
            outcome(3, StepStatus::Skipped),
        ];
        let counts = report.counts();
        assert_eq!((counts.passed, counts.failed, counts.skipped), (1, 1, 1));
    }

    #[test]
    fn test_serialize_report() {
        let mut report = SuiteReport::setup_failed(Store::Redis, "connection refused");
        report.steps = vec![outcome(1, StepStatus::Failed("nope".into()))];
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["store"], "redis");
        assert_eq!(json["setup_error"], "connection refused");
        assert_eq!(json["steps"][0]["status"], "failed");
        assert_eq!(json["steps"][0]["message"], "nope");
        assert!(json.get("teardown_error").is_none());
    }
}
