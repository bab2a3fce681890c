// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tokio::sync::OwnedMutexGuard;
use tracing::Instrument;

use crate::block::BlockInstance;
use crate::config::SharedInstance;
use crate::errors::ComputeError;
use crate::observability::messages::block::BlockStarted;
use crate::observability::messages::StructuredLog;
use crate::traits::{BlockingFn, ComputeFn};

/// Position of the instance in the graph plus how its compute went.
pub(crate) type UnitOutcome = (usize, Result<Duration, ComputeError>);

/// One dispatched compute: exclusive hold of an instance plus its compute routine.
///
/// Blocking and suspending routines look the same from the outside. Panics inside either
/// are turned into [`ComputeError::Panicked`], and the instance's `info` statistics are
/// updated before the hold is released.
pub(crate) struct WorkUnit {
    index: usize,
    instance: OwnedMutexGuard<BlockInstance>,
    compute: ComputeFn,
}

impl WorkUnit {
    pub(crate) async fn acquire(index: usize, instance: &SharedInstance) -> Self {
        let instance = instance.clone().lock_owned().await;
        let compute = instance.definition().compute().clone();
        Self {
            index,
            instance,
            compute,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// The routine to hand to the blocking pool, if this unit has a blocking one.
    pub(crate) fn blocking_fn(&self) -> Option<Arc<BlockingFn>> {
        match &self.compute {
            ComputeFn::Blocking(f) => Some(Arc::clone(f)),
            ComputeFn::Suspending(_) => None,
        }
    }

    /// Run on the current task, awaiting suspending routines in place.
    pub(crate) async fn run(mut self) -> UnitOutcome {
        let span = self.span();
        let started = Instant::now();
        let result = match &self.compute {
            ComputeFn::Blocking(f) => span.in_scope(|| catch_blocking(f.as_ref(), &mut self.instance)),
            ComputeFn::Suspending(c) => {
                CatchUnwind::new(c.compute(&mut self.instance))
                    .instrument(span)
                    .await
            }
        };
        self.complete(started, result)
    }

    /// Run a blocking routine on a thread that may block, e.g. inside `spawn_blocking`.
    pub(crate) fn run_blocking(mut self, f: &BlockingFn) -> UnitOutcome {
        let span = self.span();
        let _entered = span.enter();
        let started = Instant::now();
        let result = catch_blocking(f, &mut self.instance);
        self.complete(started, result)
    }

    fn span(&self) -> tracing::Span {
        BlockStarted {
            instance_id: self.instance.id(),
            block_type: self.instance.block_type(),
            name: self.instance.title(),
        }
        .span("compute")
    }

    fn complete(mut self, started: Instant, result: Result<(), ComputeError>) -> UnitOutcome {
        let duration = started.elapsed();
        self.instance.record_run(duration, result.is_ok());
        (self.index, result.map(|_| duration))
    }
}

fn catch_blocking(f: &BlockingFn, instance: &mut BlockInstance) -> Result<(), ComputeError> {
    catch_unwind(AssertUnwindSafe(|| f(instance)))
        .unwrap_or_else(|payload| Err(ComputeError::Panicked(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

type ComputeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ComputeError>> + Send + 'a>>;

/// Polls a compute future, converting a panic during any poll into an error.
struct CatchUnwind<'a> {
    inner: ComputeFuture<'a>,
}

impl<'a> CatchUnwind<'a> {
    fn new(inner: ComputeFuture<'a>) -> Self {
        Self { inner }
    }
}

impl Future for CatchUnwind<'_> {
    type Output = Result<(), ComputeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = self.inner.as_mut();
        match catch_unwind(AssertUnwindSafe(|| inner.poll(cx))) {
            Ok(poll) => poll,
            Err(payload) => Poll::Ready(Err(ComputeError::Panicked(panic_message(payload)))),
        }
    }
}
