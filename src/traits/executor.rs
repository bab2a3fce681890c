use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::{ExecutionMode, Graph};
use crate::engine::report::RunReport;
use crate::errors::EngineError;
use crate::observability::events::EventReporter;

/// A scheduling strategy for running every instance of a graph once.
///
/// Implementations must compute an instance only after all of its upstream instances
/// have finished and their outputs were propagated, compute each instance at most once
/// per run, and report per-instance failures through the returned [`RunReport`] rather
/// than as an `Err`.
#[async_trait]
pub trait GraphExecutor: Send + Sync {
    async fn execute(
        &self,
        graph: &Graph,
        reporter: &EventReporter,
        cancel: CancellationToken,
    ) -> Result<RunReport, EngineError>;

    fn mode(&self) -> ExecutionMode;
}
