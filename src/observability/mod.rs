// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging and the run event stream.
//!
//! * `messages` - struct-based log messages with `Display` and [`messages::StructuredLog`],
//!   so no log text is scattered through the engine
//! * `events` - typed [`events::RunEvent`]s fanned out to [`crate::traits::EventSink`]s
//!
//! Logging goes through `tracing`; binaries call [`init_tracing`] once at startup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod events;
pub mod messages;

/// Install a `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (e.g. `"info,blockflow=debug"`)
/// is used, falling back to `info` if it does not parse. Returns an error if a global
/// subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {}", e))
}
