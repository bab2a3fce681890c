use serde_json::Value;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use crate::observability::events::RunEvent;

/// Consumer of run lifecycle events.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Returning `false` means the sink is gone and can be dropped.
    fn send(&self, event: &RunEvent) -> bool;
}

/// Forward events into a channel, e.g. for a websocket bridge. Reports closed once the
/// receiver is dropped.
impl EventSink for UnboundedSender<RunEvent> {
    fn send(&self, event: &RunEvent) -> bool {
        UnboundedSender::send(self, event.clone()).is_ok()
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<RunEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl EventSink for CollectingSink {
    fn send(&self, event: &RunEvent) -> bool {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
        true
    }
}

/// Destination for values published by sink blocks.
pub trait ResultSink: Send + Sync {
    fn publish(&self, instance_id: &str, label: &str, value: &Value);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedResult {
    pub instance_id: String,
    pub label: String,
    pub value: Value,
}

/// Keeps published results in memory, in publication order.
#[derive(Debug, Default)]
pub struct MemoryResultSink {
    results: Mutex<Vec<PublishedResult>>,
}

impl MemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> Vec<PublishedResult> {
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Most recent value published by an instance.
    pub fn latest(&self, instance_id: &str) -> Option<Value> {
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .rev()
            .find(|r| r.instance_id == instance_id)
            .map(|r| r.value.clone())
    }
}

impl ResultSink for MemoryResultSink {
    fn publish(&self, instance_id: &str, label: &str, value: &Value) {
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(PublishedResult {
                instance_id: instance_id.to_string(),
                label: label.to_string(),
                value: value.clone(),
            });
    }
}
