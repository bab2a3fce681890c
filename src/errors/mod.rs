// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod engine;
mod execution;

pub use config::ConfigError;
pub use engine::EngineError;
pub use execution::{BlockExecutionError, ComputeError, FailureStrategy};
