//! Run command implementation

use clap::Args;
use proyecto_core::HarnessError;
use proyecto_runtime::suites::{StepStatus, SuiteReport};
use proyecto_runtime::SuiteManager;
use proyecto_types::Store;
use tracing::info;

use super::selected;

/// Run command arguments
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Store to run (repeatable; all stores when omitted)
    #[arg(short, long = "store")]
    pub stores: Vec<Store>,

    /// Run suites one after another instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    /// Execute the run command
    pub async fn execute(&self) -> Result<(), HarnessError> {
        let stores = selected(&self.stores);
        let manager = SuiteManager::new(proyecto_settings::settings().clone());
        info!(tag = %manager.tag().id(), stores = stores.len(), "Running suites");

        let reports = if self.sequential {
            manager.run_sequential(&stores).await
        } else {
            manager.run_concurrent(&stores).await
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else {
            for report in &reports {
                print!("{}", render_report(report));
            }
        }

        let passed = reports.iter().filter(|report| report.passed()).count();
        if passed == reports.len() {
            Ok(())
        } else {
            Err(HarnessError::assertion("passing suites", reports.len(), passed))
        }
    }
}

/// Human-readable report: a header line, then one line per step
pub fn render_report(report: &SuiteReport) -> String {
    let verdict = if report.passed() { "PASS" } else { "FAIL" };
    let mut out = format!(
        "{} {} ({} ms)\n",
        verdict,
        report.store.label(),
        report.elapsed_ms
    );

    if let Some(error) = &report.setup_error {
        out.push_str(&format!("  setup: {}\n", error));
    }
    for step in &report.steps {
        let line = match &step.status {
            StepStatus::Passed => format!("  ok   {}. {}\n", step.index, step.name),
            StepStatus::Failed(message) => {
                format!("  FAIL {}. {}: {}\n", step.index, step.name, message)
            }
            StepStatus::Skipped => format!("  skip {}. {}\n", step.index, step.name),
        };
        out.push_str(&line);
    }
    if let Some(error) = &report.teardown_error {
        out.push_str(&format!("  teardown: {}\n", error));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proyecto_runtime::suites::StepOutcome;

    fn step(index: usize, name: &str, status: StepStatus) -> StepOutcome {
        StepOutcome {
            index,
            name: name.to_string(),
            status,
            elapsed_ms: 1,
        }
    }

    #[test]
    fn test_render_failed_report() {
        let mut report = SuiteReport::new(Store::Mysql);
        report.steps = vec![
            step(1, "CREATE producto", StepStatus::Passed),
            step(2, "READ producto", StepStatus::Failed("boom".to_string())),
            step(3, "UPDATE producto", StepStatus::Skipped),
        ];

        let text = render_report(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("FAIL MySQL"));
        assert_eq!(lines[1], "  ok   1. CREATE producto");
        assert_eq!(lines[2], "  FAIL 2. READ producto: boom");
        assert_eq!(lines[3], "  skip 3. UPDATE producto");
    }

    #[test]
    fn test_render_setup_failure() {
        let report = SuiteReport::setup_failed(Store::Redis, "Connection error: refused");
        let text = render_report(&report);
        assert!(text.starts_with("FAIL Redis"));
        assert!(text.contains("  setup: Connection error: refused"));
    }

    #[test]
    fn test_render_teardown_failure() {
        let mut report = SuiteReport::new(Store::Postgres);
        report.steps = vec![step(1, "CREATE material", StepStatus::Passed)];
        report.teardown_error = Some("Assertion failed: fixtures left after teardown: expected 0, got 2".into());

        let text = render_report(&report);
        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with("left after teardown: expected 0, got 2\n"));
    }
}
