//! Step recording and the suite lifecycle driver

use proyecto_core::check::ensure_eq;
use proyecto_core::HarnessError;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::report::{StepOutcome, StepStatus, SuiteReport};
use super::traits::Suite;

/// Records the outcome of each step as a suite runs
#[derive(Debug)]
pub struct StepRecorder {
    plan: &'static [&'static str],
    outcomes: Vec<StepOutcome>,
}

impl StepRecorder {
    pub fn new(plan: &'static [&'static str]) -> Self {
        Self {
            plan,
            outcomes: Vec::with_capacity(plan.len()),
        }
    }

    /// Await one step and record how it went
    ///
    /// The step's own result is handed back so callers can chain on its value
    /// with `?`.
    pub async fn step<T, F>(&mut self, name: &str, step: F) -> Result<T, HarnessError>
    where
        F: Future<Output = Result<T, HarnessError>>,
    {
        let index = self.outcomes.len() + 1;
        debug!(step = index, name, "Running step");

        let started = Instant::now();
        let result = step.await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let status = match &result {
            Ok(_) => StepStatus::Passed,
            Err(e) => {
                if e.is_assertion() {
                    warn!(step = index, name, error = %e, "Step assertion failed");
                } else {
                    error!(step = index, name, error = %e, "Step failed");
                }
                StepStatus::Failed(e.to_string())
            }
        };

        self.outcomes.push(StepOutcome {
            index,
            name: name.to_string(),
            status,
            elapsed_ms,
        });

        result
    }

    /// True once any recorded step has failed
    pub fn has_failure(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_passed())
    }

    /// Recorded outcomes, padded with `Skipped` for planned steps that never ran
    pub fn finish(mut self) -> Vec<StepOutcome> {
        for (offset, name) in self.plan.iter().enumerate().skip(self.outcomes.len()) {
            self.outcomes.push(StepOutcome {
                index: offset + 1,
                name: name.to_string(),
                status: StepStatus::Skipped,
                elapsed_ms: 0,
            });
        }
        self.outcomes
    }
}

/// Run a connected suite: steps, teardown, residue check, close
pub async fn run_suite<S>(suite: &S) -> SuiteReport
where
    S: Suite + ?Sized,
{
    let store = suite.store();
    let started = Instant::now();
    let mut report = SuiteReport::new(store);
    info!(store = %store, "Running suite");

    let mut recorder = StepRecorder::new(suite.plan());
    if let Err(e) = suite.run_steps(&mut recorder).await {
        if !recorder.has_failure() {
            // Failed before any step could record it
            report.setup_error = Some(e.to_string());
        }
    }
    report.steps = recorder.finish();

    let mut teardown_errors = Vec::new();
    if let Err(e) = cleanup(suite).await {
        warn!(store = %store, error = %e, "Teardown failed");
        teardown_errors.push(e.to_string());
    }
    if let Err(e) = suite.close().await {
        warn!(store = %store, error = %e, "Close failed");
        teardown_errors.push(e.to_string());
    }
    if !teardown_errors.is_empty() {
        report.teardown_error = Some(teardown_errors.join("; "));
    }

    report.elapsed_ms = started.elapsed().as_millis() as u64;
    let counts = report.counts();
    info!(
        store = %store,
        passed = counts.passed,
        failed = counts.failed,
        skipped = counts.skipped,
        elapsed_ms = report.elapsed_ms,
        "Suite finished"
    );
    report
}

async fn cleanup<S>(suite: &S) -> Result<(), HarnessError>
where
    S: Suite + ?Sized,
{
    suite.teardown().await?;
    let left = suite.residue().await?;
    ensure_eq("fixtures left after teardown", left, 0)
}
