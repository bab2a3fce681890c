// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned by a block's compute routine.
#[derive(Debug, Error)]
pub enum ComputeError {
    /// A connected or required input carries no value
    #[error("input '{0}' has no value")]
    MissingInput(String),

    #[error("no interface named '{0}'")]
    UnknownInterface(String),

    /// User code tried to write the engine-owned state key
    #[error("state key '{0}' is reserved for the engine")]
    ReservedStateKey(String),

    #[error("invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("{0}")]
    Failed(String),

    /// The compute routine panicked; the payload message is kept when it is a string
    #[error("compute routine panicked: {0}")]
    Panicked(String),

    /// The unit of work was torn down before it reported back
    #[error("unit of work aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ComputeError {
    pub fn failed(message: impl Into<String>) -> Self {
        ComputeError::Failed(message.into())
    }

    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ComputeError::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// A failed compute, attributed to the instance that raised it.
///
/// These are reported through the run report and the event stream, never returned
/// as the `Err` of a run.
#[derive(Debug, Error)]
#[error("block '{instance_id}' ({block_type}) failed: {cause}")]
pub struct BlockExecutionError {
    pub instance_id: String,
    pub block_type: String,
    #[source]
    pub cause: ComputeError,
}

/// How a run reacts to the first failing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Skip the failed block's downstream and keep running unrelated branches
    #[default]
    ContinueOnError,
    /// Stop dispatching; in-flight blocks finish and everything else is skipped
    FailFast,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_execution_error_message_includes_identity_and_cause() {
        let err = BlockExecutionError {
            instance_id: "b1".into(),
            block_type: "Scale".into(),
            cause: ComputeError::MissingInput("in".into()),
        };
        assert_eq!(
            err.to_string(),
            "block 'b1' (Scale) failed: input 'in' has no value"
        );
    }

    #[test]
    fn test_failure_strategy_defaults_to_continue_on_error() {
        assert_eq!(FailureStrategy::default(), FailureStrategy::ContinueOnError);
        let parsed: FailureStrategy = serde_yaml::from_str("fail_fast").unwrap();
        assert_eq!(parsed, FailureStrategy::FailFast);
    }

    #[test]
    fn test_anyhow_errors_convert() {
        fn inner() -> Result<(), ComputeError> {
            let parsed: Result<u8, _> = "300".parse::<u8>();
            parsed.map_err(anyhow::Error::from)?;
            Ok(())
        }
        assert!(matches!(inner(), Err(ComputeError::Other(_))));
    }
}
