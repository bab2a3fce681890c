// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed run lifecycle events and their fan-out to sinks.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::config::ExecutionMode;
use crate::engine::report::{RunSummary, SkipReason};
use crate::observability::messages::block::{BlockFailed, BlockFinished, BlockSkipped, BlockStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::EventSink;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted {
        mode: ExecutionMode,
        instance_count: usize,
    },
    BlockStarted {
        instance_id: String,
        block_type: String,
        name: String,
    },
    BlockFinished {
        instance_id: String,
        duration: Duration,
    },
    BlockFailed {
        instance_id: String,
        block_type: String,
        error: String,
    },
    BlockSkipped {
        instance_id: String,
        reason: SkipReason,
    },
    RunFinished {
        summary: RunSummary,
    },
}

impl RunEvent {
    /// The instance an event is about, if any.
    pub fn instance_id(&self) -> Option<&str> {
        match self {
            RunEvent::BlockStarted { instance_id, .. }
            | RunEvent::BlockFinished { instance_id, .. }
            | RunEvent::BlockFailed { instance_id, .. }
            | RunEvent::BlockSkipped { instance_id, .. } => Some(instance_id),
            RunEvent::RunStarted { .. } | RunEvent::RunFinished { .. } => None,
        }
    }
}

impl Display for RunEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RunEvent::RunStarted {
                mode,
                instance_count,
            } => write!(f, "{} run started with {} instances", mode, instance_count),
            RunEvent::BlockStarted {
                instance_id,
                block_type,
                name,
            } => write!(f, "'{}' ({} \"{}\") started", instance_id, block_type, name),
            RunEvent::BlockFinished {
                instance_id,
                duration,
            } => write!(f, "'{}' finished in {:?}", instance_id, duration),
            RunEvent::BlockFailed {
                instance_id,
                block_type,
                error,
            } => write!(f, "'{}' ({}) failed: {}", instance_id, block_type, error),
            RunEvent::BlockSkipped {
                instance_id,
                reason,
            } => write!(f, "'{}' skipped: {}", instance_id, reason),
            RunEvent::RunFinished { summary } => write!(f, "{}", summary),
        }
    }
}

/// Logs each event and forwards it to every registered sink, in registration order.
#[derive(Default)]
pub struct EventReporter {
    sinks: RwLock<Vec<Arc<dyn EventSink>>>,
}

impl EventReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&self, sink: Arc<dyn EventSink>) {
        self.sinks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Sinks that report themselves closed are dropped after the event is delivered.
    pub fn emit(&self, event: RunEvent) {
        log_event(&event);
        let mut sinks = self
            .sinks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sinks.retain(|sink| sink.send(&event));
    }
}

impl std::fmt::Debug for EventReporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReporter")
            .field("sink_count", &self.sink_count())
            .finish()
    }
}

// Run start/finish are logged by the executors with their richer messages.
fn log_event(event: &RunEvent) {
    match event {
        RunEvent::BlockStarted {
            instance_id,
            block_type,
            name,
        } => BlockStarted {
            instance_id,
            block_type,
            name,
        }
        .log(),
        RunEvent::BlockFinished {
            instance_id,
            duration,
        } => BlockFinished {
            instance_id,
            duration: *duration,
        }
        .log(),
        RunEvent::BlockFailed {
            instance_id,
            block_type,
            error,
        } => BlockFailed {
            instance_id,
            block_type,
            error,
        }
        .log(),
        RunEvent::BlockSkipped {
            instance_id,
            reason,
        } => BlockSkipped {
            instance_id,
            reason: &reason.to_string(),
        }
        .log(),
        RunEvent::RunStarted { .. } | RunEvent::RunFinished { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::CollectingSink;

    #[test]
    fn test_reporter_fans_out_to_all_sinks() {
        let reporter = EventReporter::new();
        let first = Arc::new(CollectingSink::new());
        let second = Arc::new(CollectingSink::new());
        reporter.add_sink(first.clone());
        reporter.add_sink(second.clone());

        reporter.emit(RunEvent::BlockSkipped {
            instance_id: "b".into(),
            reason: SkipReason::Cancelled,
        });

        assert_eq!(first.events().len(), 1);
        assert_eq!(second.events(), first.events());
    }

    #[tokio::test]
    async fn test_channel_sink_receives_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let reporter = EventReporter::new();
        reporter.add_sink(Arc::new(tx));

        reporter.emit(RunEvent::BlockFinished {
            instance_id: "a".into(),
            duration: Duration::from_millis(1),
        });

        let received = rx.recv().await.unwrap();
        assert_eq!(received.instance_id(), Some("a"));
    }

    #[test]
    fn test_closed_channel_sinks_are_dropped() {
        let reporter = EventReporter::new();
        let kept = Arc::new(CollectingSink::new());
        reporter.add_sink(kept.clone());
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        reporter.add_sink(Arc::new(tx));
        drop(rx);
        assert_eq!(reporter.sink_count(), 2);

        reporter.emit(RunEvent::BlockSkipped {
            instance_id: "b".into(),
            reason: SkipReason::Cancelled,
        });

        assert_eq!(reporter.sink_count(), 1);
        assert_eq!(kept.events().len(), 1);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = RunEvent::BlockStarted {
            instance_id: "a".into(),
            block_type: "Constant".into(),
            name: "Five".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "block_started");
        assert_eq!(event.to_string(), "'a' (Constant \"Five\") started");
    }
}
