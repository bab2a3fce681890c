// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Executor that dispatches every ready instance as its own unit of work.
//!
//! # Execution Flow
//!
//! 1. Every instance with no upstream dependencies is spawned onto a [`JoinSet`]
//! 2. Whenever a unit completes its outputs are propagated on the executor task, then
//!    dependents whose last upstream just finished are spawned
//! 3. The run ends when nothing is ready and nothing is in flight
//!
//! Suspending routines are spawned as tasks, blocking routines go to the blocking pool.
//! Propagation always happens on the executor task, so no two units ever touch the same
//! instance at once.
//!
//! # Cancellation
//!
//! Once the token fires nothing new is spawned. In-flight units are allowed to finish
//! and report; everything undispatched is skipped as cancelled.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::config::{ExecutionMode, Graph};
use crate::engine::report::RunReport;
use crate::engine::scheduler::Scheduler;
use crate::engine::work_unit::{UnitOutcome, WorkUnit};
use crate::errors::{ComputeError, EngineError, FailureStrategy};
use crate::observability::events::EventReporter;
use crate::observability::messages::engine::{RunCancelled, UnitAborted};
use crate::observability::messages::StructuredLog;
use crate::traits::GraphExecutor;

#[derive(Debug, Clone, Default)]
pub struct ConcurrentExecutor {
    max_concurrency: Option<usize>,
    failure_strategy: FailureStrategy,
}

impl ConcurrentExecutor {
    /// `max_concurrency` caps in-flight units; `None` leaves it unbounded.
    pub fn new(max_concurrency: Option<usize>, failure_strategy: FailureStrategy) -> Self {
        Self {
            max_concurrency,
            failure_strategy,
        }
    }

    pub fn max_concurrency(&self) -> Option<usize> {
        self.max_concurrency
    }

    fn has_capacity(&self, in_flight: usize) -> bool {
        self.max_concurrency.map_or(true, |limit| in_flight < limit)
    }
}

#[async_trait]
impl GraphExecutor for ConcurrentExecutor {
    async fn execute(
        &self,
        graph: &Graph,
        reporter: &EventReporter,
        cancel: CancellationToken,
    ) -> Result<RunReport, EngineError> {
        let mut scheduler = Scheduler::start(
            graph,
            reporter,
            ExecutionMode::Concurrent,
            self.failure_strategy,
            self.max_concurrency,
        );
        let mut in_flight = InFlight::default();

        loop {
            if cancel.is_cancelled() && !scheduler.is_halted() {
                RunCancelled {
                    in_flight: in_flight.len(),
                }
                .log();
                scheduler.cancel();
            }

            while self.has_capacity(in_flight.len()) {
                let Some(index) = scheduler.next_ready() else {
                    break;
                };
                let unit = scheduler.dispatch(index).await;
                in_flight.spawn(unit);
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled(), if !scheduler.is_halted() => {
                    // Handled at the top of the loop.
                }
                joined = in_flight.join_next() => {
                    if let Some((index, outcome)) = joined {
                        scheduler.settle(index, outcome).await;
                    }
                }
            }
        }

        scheduler.finish().await
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Concurrent
    }
}

/// Units currently running, keyed by task so a unit whose task dies can still be settled.
#[derive(Default)]
struct InFlight {
    tasks: JoinSet<UnitOutcome>,
    indices: HashMap<Id, usize>,
}

impl InFlight {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn spawn(&mut self, unit: WorkUnit) {
        let index = unit.index();
        let handle = match unit.blocking_fn() {
            Some(compute) => self.tasks.spawn_blocking(move || unit.run_blocking(&*compute)),
            None => self.tasks.spawn(unit.run()),
        };
        self.indices.insert(handle.id(), index);
    }

    /// Wait for the next unit. A task that ended without reporting is turned into an
    /// `Aborted` outcome for its instance. `None` once nothing is left.
    async fn join_next(&mut self) -> Option<UnitOutcome> {
        loop {
            match self.tasks.join_next_with_id().await? {
                Ok((id, outcome)) => {
                    self.indices.remove(&id);
                    return Some(outcome);
                }
                Err(err) => {
                    UnitAborted {
                        error: &err.to_string(),
                    }
                    .log();
                    if let Some(index) = self.indices.remove(&err.id()) {
                        return Some((index, Err(ComputeError::Aborted(err.to_string()))));
                    }
                }
            }
        }
    }
}
