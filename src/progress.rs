//! Task progress counters and status sinks.
//!
//! A run owns one [`TaskProgress`]. Every status update turns the counters into a
//! [`ProgressSnapshot`] and hands it to the injected [`StatusSink`].

use crate::services::StatusSink;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Mutex;
use std::time::Instant;

/// Mutable progress counters for one report run
#[derive(Debug, Clone)]
pub struct TaskProgress {
    action_name: String,
    total: Option<u64>,
    attempted: u64,
    succeeded: u64,
    failed: u64,
    skipped: u64,
    started: Instant,
}

impl TaskProgress {
    pub fn new(action_name: impl Into<String>, total: Option<u64>) -> Self {
        Self {
            action_name: action_name.into(),
            total,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            started: Instant::now(),
        }
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn attempted(&self) -> u64 {
        self.attempted
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Count one batch of outcomes; keeps attempted = succeeded + failed
    pub fn record_batch(&mut self, succeeded: u64, failed: u64) {
        self.succeeded += succeeded;
        self.failed += failed;
        self.attempted = self.succeeded + self.failed;
    }

    pub fn record_skipped(&mut self, skipped: u64) {
        self.skipped += skipped;
    }

    /// Raise the total to at least `total`; totals never shrink
    pub fn raise_total(&mut self, total: u64) {
        self.total = Some(self.total.map_or(total, |t| t.max(total)));
    }

    pub fn snapshot(&self, extra: Map<String, Value>) -> ProgressSnapshot {
        ProgressSnapshot {
            action_name: self.action_name.clone(),
            attempted: self.attempted,
            succeeded: self.succeeded,
            skipped: self.skipped,
            failed: self.failed,
            total: self.total,
            duration_ms: self.started.elapsed().as_millis() as u64,
            extra,
        }
    }

    /// Publish the current counters plus `extra` and return what was published
    pub fn update_task_state(&self, sink: &dyn StatusSink, extra: Map<String, Value>) -> ProgressSnapshot {
        let snapshot = self.snapshot(extra);
        sink.update(&snapshot);
        snapshot
    }
}

/// Point-in-time view of a run's progress, as published to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub action_name: String,
    pub attempted: u64,
    pub succeeded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub total: Option<u64>,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressSnapshot {
    /// The `step` entry of the extra metadata, if any
    pub fn step(&self) -> Option<&str> {
        self.extra.get("step").and_then(Value::as_str)
    }
}

/// Build the `{"step": message}` metadata used for stage transitions
pub fn step_meta(message: &str) -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("step".to_string(), Value::String(message.to_string()));
    extra
}

/// Status sink that writes each snapshot to the debug log
#[derive(Debug, Default)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn update(&self, snapshot: &ProgressSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(json) => debug!("Task progress: {}", json),
            Err(e) => debug!("Task progress (unserializable: {}): {:?}", e, snapshot),
        }
    }
}

/// Status sink that keeps every snapshot in memory
#[derive(Debug, Default)]
pub struct MemoryStatusSink {
    updates: Mutex<Vec<ProgressSnapshot>>,
}

impl MemoryStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<ProgressSnapshot> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }

    /// The `step` values published so far, in order
    pub fn steps(&self) -> Vec<String> {
        self.updates().iter().filter_map(|s| s.step().map(str::to_string)).collect()
    }
}

impl StatusSink for MemoryStatusSink {
    fn update(&self, snapshot: &ProgressSnapshot) {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(snapshot.clone());
        }
    }
}
