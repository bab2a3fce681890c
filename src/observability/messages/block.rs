// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for block execution and registry events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// An instance was dispatched.
///
/// # Log Level
/// `debug!` - Per-instance progress
pub struct BlockStarted<'a> {
    pub instance_id: &'a str,
    pub block_type: &'a str,
    pub name: &'a str,
}

impl Display for BlockStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Block '{}' ({}, \"{}\") started",
            self.instance_id, self.block_type, self.name
        )
    }
}

impl StructuredLog for BlockStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            instance_id = self.instance_id,
            block_type = self.block_type,
            name = self.name,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "block",
            span_name = name,
            instance_id = self.instance_id,
            block_type = self.block_type,
        )
    }
}

/// An instance computed successfully and its outputs were propagated.
///
/// # Log Level
/// `debug!` - Per-instance progress
pub struct BlockFinished<'a> {
    pub instance_id: &'a str,
    pub duration: Duration,
}

impl Display for BlockFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Block '{}' finished in {:?}",
            self.instance_id, self.duration
        )
    }
}

impl StructuredLog for BlockFinished<'_> {
    fn log(&self) {
        tracing::debug!(
            instance_id = self.instance_id,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "block_finished",
            span_name = name,
            instance_id = self.instance_id,
            duration = ?self.duration,
        )
    }
}

/// An instance's compute routine returned an error or panicked.
///
/// # Log Level
/// `warn!` - The run continues, but the result is incomplete
pub struct BlockFailed<'a> {
    pub instance_id: &'a str,
    pub block_type: &'a str,
    pub error: &'a str,
}

impl Display for BlockFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Block '{}' ({}) failed: {}",
            self.instance_id, self.block_type, self.error
        )
    }
}

impl StructuredLog for BlockFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            instance_id = self.instance_id,
            block_type = self.block_type,
            error = self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "block_failed",
            span_name = name,
            instance_id = self.instance_id,
            block_type = self.block_type,
        )
    }
}

/// An instance was not computed this run.
///
/// # Log Level
/// `info!` - Explains gaps in the results
pub struct BlockSkipped<'a> {
    pub instance_id: &'a str,
    pub reason: &'a str,
}

impl Display for BlockSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Block '{}' skipped: {}", self.instance_id, self.reason)
    }
}

impl StructuredLog for BlockSkipped<'_> {
    fn log(&self) {
        tracing::info!(
            instance_id = self.instance_id,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "block_skipped",
            span_name = name,
            instance_id = self.instance_id,
        )
    }
}

/// A definition was added to a registry.
///
/// # Log Level
/// `debug!` - Configuration detail
pub struct BlockRegistered<'a> {
    pub name: &'a str,
    pub replaced: bool,
}

impl Display for BlockRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.replaced {
            write!(f, "Block type '{}' re-registered", self.name)
        } else {
            write!(f, "Block type '{}' registered", self.name)
        }
    }
}

impl StructuredLog for BlockRegistered<'_> {
    fn log(&self) {
        tracing::debug!(name = self.name, replaced = self.replaced, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("block_registered", span_name = name, block = self.name)
    }
}

pub struct BlockUnregistered<'a> {
    pub name: &'a str,
}

impl Display for BlockUnregistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Block type '{}' unregistered", self.name)
    }
}

impl StructuredLog for BlockUnregistered<'_> {
    fn log(&self) {
        tracing::debug!(name = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("block_unregistered", span_name = name, block = self.name)
    }
}
