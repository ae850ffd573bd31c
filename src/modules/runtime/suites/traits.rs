//! Suite trait definition

use async_trait::async_trait;
use proyecto_core::HarnessError;
use proyecto_types::Store;

use super::recorder::StepRecorder;

/// A connected store suite
///
/// Implementations own their connection or pool. `run_suite` drives the
/// lifecycle: steps, then teardown and residue check, then close. Teardown and
/// close run whatever the steps returned.
#[async_trait]
pub trait Suite: Send + Sync {
    /// Store exercised by this suite
    fn store(&self) -> Store;

    /// Step names in execution order
    fn plan(&self) -> &'static [&'static str];

    /// Run the ordered steps, recording each one
    ///
    /// Steps are chained: values produced by one step (inserted ids) are
    /// passed to the next. The first failure is returned and ends the chain.
    async fn run_steps(&self, recorder: &mut StepRecorder) -> Result<(), HarnessError>;

    /// Remove every fixture created by this run, children before parents
    async fn teardown(&self) -> Result<(), HarnessError>;

    /// Count fixtures of this run still present in the store
    async fn residue(&self) -> Result<u64, HarnessError>;

    /// Check the connection is healthy
    async fn ping(&self) -> Result<(), HarnessError>;

    /// Release the connection or pool
    async fn close(&self) -> Result<(), HarnessError>;
}
