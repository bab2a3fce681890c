// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::block::RunInfo;
use crate::config::ExecutionMode;
use crate::errors::BlockExecutionError;

/// Why an instance was not computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// A transitive upstream instance failed
    UpstreamFailed { upstream: String },
    /// The run was cancelled before the instance was dispatched
    Cancelled,
    /// Fail-fast stopped the run after `failed` failed
    RunAborted { failed: String },
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UpstreamFailed { upstream } => write!(f, "upstream '{}' failed", upstream),
            SkipReason::Cancelled => f.write_str("cancelled"),
            SkipReason::RunAborted { failed } => {
                write!(f, "run aborted after '{}' failed", failed)
            }
        }
    }
}

/// Final status of one instance in a run.
#[derive(Debug)]
pub enum BlockStatus {
    Finished { duration: Duration },
    Failed { error: BlockExecutionError },
    Skipped { reason: SkipReason },
}

impl BlockStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, BlockStatus::Finished { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BlockStatus::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, BlockStatus::Skipped { .. })
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            BlockStatus::Skipped { reason } => Some(reason),
            _ => None,
        }
    }
}

impl Display for BlockStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockStatus::Finished { duration } => write!(f, "finished in {:?}", duration),
            BlockStatus::Failed { error } => write!(f, "failed: {}", error.cause),
            BlockStatus::Skipped { reason } => write!(f, "skipped: {}", reason),
        }
    }
}

/// Counts of instance outcomes for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub success: bool,
    pub cancelled: bool,
    pub finished: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: Duration,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let outcome = match (self.success, self.cancelled) {
            (true, _) => "succeeded",
            (false, true) => "cancelled",
            (false, false) => "failed",
        };
        write!(
            f,
            "run {} in {:?}: {} finished, {} failed, {} skipped",
            outcome, self.duration, self.finished, self.failed, self.skipped
        )
    }
}

/// Outcome and final interface values of one instance.
#[derive(Debug)]
pub struct InstanceReport {
    pub id: String,
    pub block_type: String,
    pub status: BlockStatus,
    pub inputs: BTreeMap<String, Value>,
    pub outputs: BTreeMap<String, Value>,
    /// Run statistics accumulated across runs of the same graph
    pub info: RunInfo,
}

/// Result of a run. Per-instance failures live here; they are never the `Err` of a run.
#[derive(Debug)]
pub struct RunReport {
    pub mode: ExecutionMode,
    pub summary: RunSummary,
    /// In declaration order
    pub instances: Vec<InstanceReport>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.summary.success
    }

    pub fn instance(&self, id: &str) -> Option<&InstanceReport> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn status(&self, id: &str) -> Option<&BlockStatus> {
        self.instance(id).map(|i| &i.status)
    }

    pub fn output(&self, id: &str, name: &str) -> Option<&Value> {
        self.instance(id).and_then(|i| i.outputs.get(name))
    }

    pub fn failures(&self) -> impl Iterator<Item = &BlockExecutionError> {
        self.instances.iter().filter_map(|i| match &i.status {
            BlockStatus::Failed { error } => Some(error),
            _ => None,
        })
    }
}
