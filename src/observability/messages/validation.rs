// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for schema and configuration validation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The instance dependency graph contains a cycle.
///
/// # Log Level
/// `warn!` - The schema is rejected
pub struct CycleDetected<'a> {
    pub cycle: &'a [String],
}

impl Display for CycleDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CycleDetected<'_> {
    fn log(&self) {
        tracing::warn!(cycle = ?self.cycle, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("cycle_detected", span_name = name, length = self.cycle.len())
    }
}

/// A schema failed to build; the previously active graph stays in place.
///
/// # Log Level
/// `warn!`
pub struct SchemaRejected<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for SchemaRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Schema rejected: {}", self.error)
    }
}

impl StructuredLog for SchemaRejected<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("schema_rejected", span_name = name)
    }
}

/// An engine configuration file was read and validated.
///
/// # Log Level
/// `info!`
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub mode: &'a str,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded engine config '{}' (mode={})", self.path, self.mode)
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, mode = self.mode, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config_loaded", span_name = name, path = self.path)
    }
}
