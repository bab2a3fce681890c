// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dependency-counting bookkeeping shared by the sequential and concurrent executors.
//!
//! The scheduler owns everything about a single run except *how* units of work are
//! executed:
//!
//! * `remaining[i]` counts the distinct upstream instances of `i` that have not finished
//! * the ready set holds instances whose count reached zero, ordered by declaration index
//!   so ties break the same way on every run
//! * each instance ends the run with exactly one [`BlockStatus`]
//!
//! Executors loop on [`Scheduler::next_ready`], run the [`WorkUnit`] returned by
//! [`Scheduler::dispatch`] however they like and hand the outcome back to
//! [`Scheduler::settle`], which propagates outputs before any dependent becomes ready.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::config::{ExecutionMode, Graph};
use crate::engine::report::{BlockStatus, InstanceReport, RunReport, RunSummary, SkipReason};
use crate::engine::work_unit::WorkUnit;
use crate::errors::{BlockExecutionError, ComputeError, EngineError, FailureStrategy};
use crate::observability::events::{EventReporter, RunEvent};
use crate::observability::messages::engine::{RunCompleted, RunStarted};
use crate::observability::messages::StructuredLog;

pub(crate) struct Scheduler<'g> {
    graph: &'g Graph,
    reporter: &'g EventReporter,
    mode: ExecutionMode,
    failure_strategy: FailureStrategy,
    remaining: Vec<usize>,
    ready: BTreeSet<usize>,
    statuses: Vec<Option<BlockStatus>>,
    /// Set once nothing new may be dispatched; also the reason given to leftovers.
    halt: Option<SkipReason>,
    started: Instant,
}

impl<'g> Scheduler<'g> {
    /// Seed the ready set and announce the run.
    pub(crate) fn start(
        graph: &'g Graph,
        reporter: &'g EventReporter,
        mode: ExecutionMode,
        failure_strategy: FailureStrategy,
        max_concurrency: Option<usize>,
    ) -> Self {
        let remaining = graph.dependencies().in_degrees().to_vec();
        let ready = remaining
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(index, _)| index)
            .collect();

        RunStarted {
            mode: mode.as_str(),
            instance_count: graph.len(),
            max_concurrency,
        }
        .log();
        reporter.emit(RunEvent::RunStarted {
            mode,
            instance_count: graph.len(),
        });

        Self {
            graph,
            reporter,
            mode,
            failure_strategy,
            remaining,
            ready,
            statuses: (0..graph.len()).map(|_| None).collect(),
            halt: None,
            started: Instant::now(),
        }
    }

    /// Lowest-declared ready instance, unless the run was halted.
    pub(crate) fn next_ready(&mut self) -> Option<usize> {
        if self.halt.is_some() {
            return None;
        }
        self.ready.pop_first()
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    /// Stop dispatching; undispatched instances end up `Skipped { Cancelled }`.
    pub(crate) fn cancel(&mut self) {
        if self.halt.is_none() {
            self.halt = Some(SkipReason::Cancelled);
        }
    }

    /// Announce `index` and take exclusive hold of its instance.
    pub(crate) async fn dispatch(&self, index: usize) -> WorkUnit {
        let node = &self.graph.nodes()[index];
        self.reporter.emit(RunEvent::BlockStarted {
            instance_id: node.id().to_string(),
            block_type: node.block_type().to_string(),
            name: node.title().to_string(),
        });
        WorkUnit::acquire(index, node.instance()).await
    }

    /// Record the outcome of a unit of work.
    ///
    /// On success the outputs are copied downstream before dependents are released. On
    /// failure the whole downstream cone is skipped.
    pub(crate) async fn settle(&mut self, index: usize, outcome: Result<Duration, ComputeError>) {
        let graph = self.graph;
        let node = &graph.nodes()[index];
        match outcome {
            Ok(duration) => {
                graph.propagate_outputs(index).await;
                self.statuses[index] = Some(BlockStatus::Finished { duration });
                self.reporter.emit(RunEvent::BlockFinished {
                    instance_id: node.id().to_string(),
                    duration,
                });
                for &dependent in graph.dependencies().dependents(index) {
                    self.remaining[dependent] -= 1;
                    if self.remaining[dependent] == 0 && self.statuses[dependent].is_none() {
                        self.ready.insert(dependent);
                    }
                }
            }
            Err(cause) => {
                let error = BlockExecutionError {
                    instance_id: node.id().to_string(),
                    block_type: node.block_type().to_string(),
                    cause,
                };
                self.reporter.emit(RunEvent::BlockFailed {
                    instance_id: error.instance_id.clone(),
                    block_type: error.block_type.clone(),
                    error: error.cause.to_string(),
                });
                self.statuses[index] = Some(BlockStatus::Failed { error });
                self.skip_downstream(index);

                if self.failure_strategy == FailureStrategy::FailFast && self.halt.is_none() {
                    self.halt = Some(SkipReason::RunAborted {
                        failed: node.id().to_string(),
                    });
                }
            }
        }
    }

    fn skip_downstream(&mut self, failed: usize) {
        let graph = self.graph;
        let upstream = graph.nodes()[failed].id().to_string();
        let mut stack: Vec<usize> = graph.dependencies().dependents(failed).to_vec();
        while let Some(index) = stack.pop() {
            if self.statuses[index].is_some() {
                continue;
            }
            self.mark_skipped(
                index,
                SkipReason::UpstreamFailed {
                    upstream: upstream.clone(),
                },
            );
            stack.extend_from_slice(graph.dependencies().dependents(index));
        }
    }

    fn mark_skipped(&mut self, index: usize, reason: SkipReason) {
        self.ready.remove(&index);
        self.reporter.emit(RunEvent::BlockSkipped {
            instance_id: self.graph.nodes()[index].id().to_string(),
            reason: reason.clone(),
        });
        self.statuses[index] = Some(BlockStatus::Skipped { reason });
    }

    /// Close out the run once nothing is in flight.
    ///
    /// Every instance must have a status by now; the only legitimate leftovers are those
    /// stranded by a halt.
    pub(crate) async fn finish(mut self) -> Result<RunReport, EngineError> {
        let leftovers: Vec<usize> = (0..self.statuses.len())
            .filter(|&index| self.statuses[index].is_none())
            .collect();
        if !leftovers.is_empty() {
            let Some(reason) = self.halt.clone() else {
                let ids: Vec<&str> = leftovers
                    .iter()
                    .map(|&index| self.graph.nodes()[index].id())
                    .collect();
                return Err(EngineError::Internal(format!(
                    "instances never became ready: {}",
                    ids.join(", ")
                )));
            };
            for index in leftovers {
                self.mark_skipped(index, reason.clone());
            }
        }

        let mut instances = Vec::with_capacity(self.graph.len());
        let mut summary = RunSummary {
            cancelled: self.halt == Some(SkipReason::Cancelled),
            duration: self.started.elapsed(),
            ..RunSummary::default()
        };
        for (index, status) in self.statuses.into_iter().enumerate() {
            let Some(status) = status else {
                return Err(EngineError::Internal(format!(
                    "instance at position {} has no status",
                    index
                )));
            };
            match &status {
                BlockStatus::Finished { .. } => summary.finished += 1,
                BlockStatus::Failed { .. } => summary.failed += 1,
                BlockStatus::Skipped { .. } => summary.skipped += 1,
            }
            let node = &self.graph.nodes()[index];
            let snapshot = self.graph.snapshot(index).await;
            let info = node.instance().lock().await.info();
            instances.push(InstanceReport {
                id: node.id().to_string(),
                block_type: node.block_type().to_string(),
                status,
                inputs: snapshot.inputs,
                outputs: snapshot.outputs,
                info,
            });
        }
        summary.success = summary.failed == 0 && summary.skipped == 0;

        RunCompleted {
            mode: self.mode.as_str(),
            finished: summary.finished,
            failed: summary.failed,
            skipped: summary.skipped,
            duration: summary.duration,
        }
        .log();
        self.reporter.emit(RunEvent::RunFinished {
            summary: summary.clone(),
        });

        Ok(RunReport {
            mode: self.mode,
            summary,
            instances,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockDefinition;
    use crate::config::{build_graph, BlockRegistry, SchemaDescription};
    use crate::traits::CollectingSink;
    use serde_json::json;
    use std::sync::Arc;

    fn registry() -> BlockRegistry {
        let mut registry = BlockRegistry::new();
        registry
            .register(
                BlockDefinition::builder("Pass")
                    .add_input("in")
                    .add_output("out")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    // a feeds b and c; b feeds d
    fn diamond() -> Graph {
        let schema = SchemaDescription::new()
            .node("a", "Pass")
            .node("b", "Pass")
            .node("c", "Pass")
            .node("d", "Pass")
            .connect("a", "out", "b", "in")
            .connect("a", "out", "c", "in")
            .connect("b", "out", "d", "in");
        build_graph(Some(&schema), &registry()).unwrap()
    }

    #[tokio::test]
    async fn test_ready_set_follows_declaration_order() {
        let graph = diamond();
        let reporter = EventReporter::new();
        let mut scheduler = Scheduler::start(
            &graph,
            &reporter,
            ExecutionMode::Sequential,
            FailureStrategy::ContinueOnError,
            None,
        );

        assert_eq!(scheduler.next_ready(), Some(0));
        assert_eq!(scheduler.next_ready(), None);
        scheduler.settle(0, Ok(Duration::ZERO)).await;
        assert_eq!(scheduler.next_ready(), Some(1));
        assert_eq!(scheduler.next_ready(), Some(2));
    }

    #[tokio::test]
    async fn test_failure_skips_downstream_cone() {
        let graph = diamond();
        let reporter = EventReporter::new();
        let sink = Arc::new(CollectingSink::new());
        reporter.add_sink(sink.clone());
        let mut scheduler = Scheduler::start(
            &graph,
            &reporter,
            ExecutionMode::Sequential,
            FailureStrategy::ContinueOnError,
            None,
        );

        let a = scheduler.next_ready().unwrap();
        scheduler.settle(a, Ok(Duration::ZERO)).await;
        let b = scheduler.next_ready().unwrap();
        scheduler.settle(b, Err(ComputeError::failed("boom"))).await;
        let c = scheduler.next_ready().unwrap();
        scheduler.settle(c, Ok(Duration::ZERO)).await;
        assert_eq!(scheduler.next_ready(), None);

        let report = scheduler.finish().await.unwrap();
        assert!(!report.success());
        assert!(report.status("b").unwrap().is_failed());
        assert!(report.status("c").unwrap().is_finished());
        assert_eq!(
            report.status("d").unwrap().skip_reason(),
            Some(&SkipReason::UpstreamFailed {
                upstream: "b".into()
            })
        );
        assert!(matches!(
            sink.events().last(),
            Some(RunEvent::RunFinished { .. })
        ));
    }

    #[tokio::test]
    async fn test_outputs_propagate_on_settle() {
        let graph = diamond();
        let reporter = EventReporter::new();
        let mut scheduler = Scheduler::start(
            &graph,
            &reporter,
            ExecutionMode::Sequential,
            FailureStrategy::ContinueOnError,
            None,
        );
        graph
            .instance("a")
            .unwrap()
            .lock()
            .await
            .set_output("out", json!(7))
            .unwrap();

        let a = scheduler.next_ready().unwrap();
        scheduler.settle(a, Ok(Duration::ZERO)).await;

        let b = graph.instance("b").unwrap().lock().await;
        assert_eq!(b.input("in").unwrap(), &json!(7));
    }

    #[tokio::test]
    async fn test_fail_fast_halts_and_aborts_leftovers() {
        let graph = diamond();
        let reporter = EventReporter::new();
        let mut scheduler = Scheduler::start(
            &graph,
            &reporter,
            ExecutionMode::Sequential,
            FailureStrategy::FailFast,
            None,
        );

        let a = scheduler.next_ready().unwrap();
        scheduler.settle(a, Ok(Duration::ZERO)).await;
        let b = scheduler.next_ready().unwrap();
        scheduler.settle(b, Err(ComputeError::failed("boom"))).await;
        assert!(scheduler.is_halted());
        assert_eq!(scheduler.next_ready(), None);

        let report = scheduler.finish().await.unwrap();
        assert_eq!(
            report.status("c").unwrap().skip_reason(),
            Some(&SkipReason::RunAborted { failed: "b".into() })
        );
        assert_eq!(report.summary.skipped, 2);
    }

    #[tokio::test]
    async fn test_unreached_instances_without_halt_are_internal_errors() {
        let graph = diamond();
        let reporter = EventReporter::new();
        let scheduler = Scheduler::start(
            &graph,
            &reporter,
            ExecutionMode::Sequential,
            FailureStrategy::ContinueOnError,
            None,
        );

        let err = scheduler.finish().await.unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }
}
