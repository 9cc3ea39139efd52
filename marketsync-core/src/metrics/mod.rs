//! Metrics for sync operations and store transitions
//!
//! Recorded through the `metrics` facade; without an installed recorder the
//! calls are no-ops.

use crate::core_sync::transition::TransitionKind;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize metrics with descriptions
pub fn init_metrics() {
    describe_counter!("sync.operations.total", "Sync operations started, by operation");
    describe_counter!(
        "sync.operations.failed",
        "Sync operations that ended in an error, by operation"
    );
    describe_counter!(
        "sync.operations.skipped",
        "Sync operations skipped for an unmet precondition"
    );
    describe_histogram!("sync.operation.duration_ms", "Sync operation duration in milliseconds");
    describe_counter!("store.transitions.applied", "Transitions applied by the store, by kind");
}

/// Count one applied transition
pub fn record_transition(kind: TransitionKind) {
    counter!("store.transitions.applied", "kind" => kind.as_str()).increment(1);
}

pub fn record_operation_started(operation: &'static str) {
    counter!("sync.operations.total", "operation" => operation).increment(1);
}

pub fn record_operation_failed(operation: &'static str) {
    counter!("sync.operations.failed", "operation" => operation).increment(1);
}

pub fn record_operation_skipped(operation: &'static str) {
    counter!("sync.operations.skipped", "operation" => operation).increment(1);
}

/// Timer for measuring operation duration
pub struct Timer {
    operation: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(self) {
        let elapsed = self.start.elapsed();
        histogram!("sync.operation.duration_ms", "operation" => self.operation)
            .record(elapsed.as_secs_f64() * 1000.0);
    }
}
