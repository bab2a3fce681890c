// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::ConfigError;

/// Usage and configuration errors surfaced by the engine façade.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A run was requested before any schema was loaded
    #[error("engine not configured: load a schema before running")]
    NotConfigured,

    /// A run is in flight; the operation was refused rather than queued
    #[error("engine busy: cannot {operation} while a run is in progress")]
    Busy { operation: &'static str },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A scheduler invariant did not hold
    #[error("internal error: {0}")]
    Internal(String),
}
