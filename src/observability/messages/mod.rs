// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it with structured fields at its intended level.
//!
//! * `engine` - run lifecycle, schema loading and engine usage errors
//! * `block` - per-instance execution events and registry changes
//! * `validation` - schema and configuration rejections
//!
//! ```rust
//! use blockflow::observability::messages::engine::SchemaLoaded;
//! use blockflow::observability::messages::StructuredLog;
//!
//! SchemaLoaded {
//!     instance_count: 3,
//!     connection_count: 2,
//! }
//! .log();
//! ```

use tracing::Span;

pub mod block;
pub mod engine;
pub mod validation;

/// Emit a message as a structured tracing event, or open a span carrying its fields.
pub trait StructuredLog {
    fn log(&self);

    fn span(&self, name: &str) -> Span;
}
