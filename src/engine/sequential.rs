// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One-at-a-time executor.
//!
//! Computes run on the caller's task in the stable order returned by
//! [`Graph::execution_order`]: among ready instances the earliest declared goes first.
//! Blocking routines are called inline and suspending routines are awaited inline, so a
//! run is fully deterministic. Cancellation is checked between units.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::{ExecutionMode, Graph};
use crate::engine::report::RunReport;
use crate::engine::scheduler::Scheduler;
use crate::errors::{EngineError, FailureStrategy};
use crate::observability::events::EventReporter;
use crate::observability::messages::engine::RunCancelled;
use crate::observability::messages::StructuredLog;
use crate::traits::GraphExecutor;

#[derive(Debug, Clone, Default)]
pub struct SequentialExecutor {
    failure_strategy: FailureStrategy,
}

impl SequentialExecutor {
    pub fn new(failure_strategy: FailureStrategy) -> Self {
        Self { failure_strategy }
    }
}

#[async_trait]
impl GraphExecutor for SequentialExecutor {
    async fn execute(
        &self,
        graph: &Graph,
        reporter: &EventReporter,
        cancel: CancellationToken,
    ) -> Result<RunReport, EngineError> {
        let mut scheduler = Scheduler::start(
            graph,
            reporter,
            ExecutionMode::Sequential,
            self.failure_strategy,
            Some(1),
        );

        loop {
            if cancel.is_cancelled() && !scheduler.is_halted() {
                RunCancelled { in_flight: 0 }.log();
                scheduler.cancel();
            }
            let Some(index) = scheduler.next_ready() else {
                break;
            };
            let (index, outcome) = scheduler.dispatch(index).await.run().await;
            scheduler.settle(index, outcome).await;
        }

        scheduler.finish().await
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Sequential
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockDefinition;
    use crate::config::{build_graph, BlockRegistry, SchemaDescription};
    use crate::engine::report::SkipReason;
    use crate::observability::events::RunEvent;
    use crate::traits::CollectingSink;
    use serde_json::json;
    use std::sync::Arc;

    fn registry() -> BlockRegistry {
        let mut registry = BlockRegistry::new();
        registry
            .register(
                BlockDefinition::builder("Increment")
                    .add_input_with_default("in", json!(0))
                    .add_output("out")
                    .compute_blocking(|i| {
                        let value = i.require_input_f64("in")?;
                        i.set_output("out", json!(value + 1.0))
                    })
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    fn chain() -> Graph {
        let schema = SchemaDescription::new()
            .node("c", "Increment")
            .node("a", "Increment")
            .node("b", "Increment")
            .connect("a", "out", "b", "in")
            .connect("b", "out", "c", "in");
        build_graph(Some(&schema), &registry()).unwrap()
    }

    fn started_ids(events: &[RunEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                RunEvent::BlockStarted { instance_id, .. } => Some(instance_id.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_runs_in_dependency_order() {
        let graph = chain();
        let reporter = EventReporter::new();
        let sink = Arc::new(CollectingSink::new());
        reporter.add_sink(sink.clone());

        let report = SequentialExecutor::default()
            .execute(&graph, &reporter, CancellationToken::new())
            .await
            .unwrap();

        assert!(report.success());
        assert_eq!(report.output("c", "out"), Some(&json!(3.0)));
        assert_eq!(started_ids(&sink.events()), vec!["a", "b", "c"]);
        assert_eq!(graph.execution_order(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_skips_everything() {
        let graph = chain();
        let reporter = EventReporter::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = SequentialExecutor::default()
            .execute(&graph, &reporter, cancel)
            .await
            .unwrap();

        assert!(report.summary.cancelled);
        assert_eq!(report.summary.skipped, 3);
        assert!(report
            .instances
            .iter()
            .all(|i| i.status.skip_reason() == Some(&SkipReason::Cancelled)));
    }
}
