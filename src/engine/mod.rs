// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod compute_engine;
pub mod concurrent;
pub mod factory;
pub mod report;
pub mod sequential;
mod scheduler;
mod work_unit;

pub use compute_engine::ComputeEngine;
pub use concurrent::ConcurrentExecutor;
pub use factory::ExecutorFactory;
pub use report::{BlockStatus, InstanceReport, RunReport, RunSummary, SkipReason};
pub use sequential::SequentialExecutor;
