// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for engine lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Run lifecycle (start, completion, cancellation)
//! * Registry and schema changes
//! * Refused operations while a run is in flight

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use blockflow::observability::messages::engine::RunStarted;
///
/// let msg = RunStarted {
///     mode: "concurrent",
///     instance_count: 5,
///     max_concurrency: None,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Starting concurrent run: 5 instances, max_concurrency=unbounded"
/// );
/// ```
pub struct RunStarted<'a> {
    pub mode: &'a str,
    pub instance_count: usize,
    pub max_concurrency: Option<usize>,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.max_concurrency {
            Some(limit) => write!(
                f,
                "Starting {} run: {} instances, max_concurrency={}",
                self.mode, self.instance_count, limit
            ),
            None => write!(
                f,
                "Starting {} run: {} instances, max_concurrency=unbounded",
                self.mode, self.instance_count
            ),
        }
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            mode = self.mode,
            instance_count = self.instance_count,
            max_concurrency = ?self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            mode = self.mode,
            instance_count = self.instance_count,
        )
    }
}

/// Run completed, successfully or not.
///
/// # Log Level
/// `info!` on success, `warn!` when any instance failed or was skipped
pub struct RunCompleted<'a> {
    pub mode: &'a str,
    pub finished: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: std::time::Duration,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} run completed in {:?}: {} finished, {} failed, {} skipped",
            self.mode, self.duration, self.finished, self.failed, self.skipped
        )
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        if self.failed == 0 && self.skipped == 0 {
            tracing::info!(
                mode = self.mode,
                finished = self.finished,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        } else {
            tracing::warn!(
                mode = self.mode,
                finished = self.finished,
                failed = self.failed,
                skipped = self.skipped,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            mode = self.mode,
            duration = ?self.duration,
        )
    }
}

/// Cancellation observed; nothing further will be dispatched.
///
/// # Log Level
/// `info!`
pub struct RunCancelled {
    pub in_flight: usize,
}

impl Display for RunCancelled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run cancelled: waiting for {} in-flight block(s)",
            self.in_flight
        )
    }
}

impl StructuredLog for RunCancelled {
    fn log(&self) {
        tracing::info!(in_flight = self.in_flight, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("run_cancelled", span_name = name, in_flight = self.in_flight)
    }
}

/// A unit of work was torn down without reporting back.
///
/// # Log Level
/// `error!` - Only happens when the runtime aborts tasks
pub struct UnitAborted<'a> {
    pub error: &'a str,
}

impl Display for UnitAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unit of work aborted: {}", self.error)
    }
}

impl StructuredLog for UnitAborted<'_> {
    fn log(&self) {
        tracing::error!(error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("unit_aborted", span_name = name)
    }
}

/// A new graph became active.
///
/// # Log Level
/// `info!`
pub struct SchemaLoaded {
    pub instance_count: usize,
    pub connection_count: usize,
}

impl Display for SchemaLoaded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Schema loaded: {} instances, {} connections",
            self.instance_count, self.connection_count
        )
    }
}

impl StructuredLog for SchemaLoaded {
    fn log(&self) {
        tracing::info!(
            instance_count = self.instance_count,
            connection_count = self.connection_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "schema_loaded",
            span_name = name,
            instance_count = self.instance_count,
        )
    }
}

/// The engine's block catalogue was replaced.
///
/// # Log Level
/// `info!`
pub struct RegistryConfigured {
    pub block_count: usize,
}

impl Display for RegistryConfigured {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Registry configured with {} block types", self.block_count)
    }
}

impl StructuredLog for RegistryConfigured {
    fn log(&self) {
        tracing::info!(block_count = self.block_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("registry_configured", span_name = name)
    }
}

/// An operation was refused because a run holds the engine.
///
/// # Log Level
/// `warn!`
pub struct EngineBusy<'a> {
    pub operation: &'a str,
}

impl Display for EngineBusy<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Refused to {}: a run is in progress", self.operation)
    }
}

impl StructuredLog for EngineBusy<'_> {
    fn log(&self) {
        tracing::warn!(operation = self.operation, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("engine_busy", span_name = name, operation = self.operation)
    }
}
