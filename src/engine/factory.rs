// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{EngineConfig, ExecutionMode};
use crate::engine::concurrent::ConcurrentExecutor;
use crate::engine::sequential::SequentialExecutor;
use crate::traits::GraphExecutor;

/// Factory for creating graph executors from configuration
pub struct ExecutorFactory;

impl ExecutorFactory {
    /// Create an executor for the configured mode
    pub fn from_config(cfg: &EngineConfig) -> Box<dyn GraphExecutor> {
        Self::create(cfg.mode, cfg)
    }

    /// Create an executor for `mode`, taking the remaining tuning from `cfg`
    pub fn create(mode: ExecutionMode, cfg: &EngineConfig) -> Box<dyn GraphExecutor> {
        match mode {
            ExecutionMode::Sequential => Box::new(SequentialExecutor::new(cfg.failure_strategy)),
            ExecutionMode::Concurrent => Box::new(ConcurrentExecutor::new(
                cfg.executor_options.max_concurrency,
                cfg.failure_strategy,
            )),
        }
    }
}
