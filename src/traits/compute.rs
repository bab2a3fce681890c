// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::block::BlockInstance;
use crate::errors::ComputeError;

/// A compute routine that may suspend (timers, I/O, channels).
///
/// The instance is handed over as an explicit argument; implementations read inputs and
/// options from it and write outputs and state back into it.
#[async_trait]
pub trait Compute: Send + Sync {
    async fn compute(&self, instance: &mut BlockInstance) -> Result<(), ComputeError>;
}

pub type BlockingFn = dyn Fn(&mut BlockInstance) -> Result<(), ComputeError> + Send + Sync;

/// The compute reference stored in a block definition.
///
/// Blocking routines run on the caller's task in sequential mode and on the blocking
/// pool in concurrent mode. Suspending routines are awaited in both.
#[derive(Clone)]
pub enum ComputeFn {
    Blocking(Arc<BlockingFn>),
    Suspending(Arc<dyn Compute>),
}

impl ComputeFn {
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(&mut BlockInstance) -> Result<(), ComputeError> + Send + Sync + 'static,
    {
        ComputeFn::Blocking(Arc::new(f))
    }

    pub fn suspending<C>(compute: C) -> Self
    where
        C: Compute + 'static,
    {
        ComputeFn::Suspending(Arc::new(compute))
    }

    /// Does nothing; the default for definitions that only carry data.
    pub fn noop() -> Self {
        ComputeFn::blocking(|_| Ok(()))
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, ComputeFn::Blocking(_))
    }
}

impl fmt::Debug for ComputeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeFn::Blocking(_) => f.write_str("ComputeFn::Blocking"),
            ComputeFn::Suspending(_) => f.write_str("ComputeFn::Suspending"),
        }
    }
}
