// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the catalog query layer.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding service is responsible for choosing the exporter.
//!
//! # Metric Naming Convention
//! - `catalog_query_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: query, metacard_by_id, facet, related, create, save, delete, sources
//! - `status`: success, error, partial

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Record a client operation outcome
pub fn record_query(operation: &str, status: &str) {
    counter!(
        "catalog_query_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record client operation latency
pub fn record_query_latency(operation: &str, duration: Duration) {
    histogram!(
        "catalog_query_operation_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record total hits reported by the backend
pub fn record_query_hits(hits: u64) {
    histogram!("catalog_query_hits").record(hits as f64);
}

/// Record a predicate compilation outcome
pub fn record_compile(success: bool) {
    let status = if success { "success" } else { "error" };
    counter!(
        "catalog_query_compilations_total",
        "status" => status
    )
    .increment(1);
}

/// Record a backend error by kind
pub fn record_error(operation: &str, kind: &str) {
    counter!(
        "catalog_query_errors_total",
        "operation" => operation.to_string(),
        "error_type" => kind.to_string()
    )
    .increment(1);
}

// ═══════════════════════════════════════════════════════════════════════════
// SCHEMA - Snapshot publication and metadata refresh
// ═══════════════════════════════════════════════════════════════════════════

/// Set the version of the published schema snapshot
pub fn set_schema_version(version: u64) {
    gauge!("catalog_query_schema_version").set(version as f64);
}

/// Set the number of attributes in the published schema
pub fn set_schema_attributes(count: usize) {
    gauge!("catalog_query_schema_attributes").set(count as f64);
}

/// Record a schema refresh (success, partial, error)
pub fn record_schema_refresh(status: &str) {
    counter!(
        "catalog_query_schema_refresh_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a failed per-group enumeration fetch
pub fn record_enumeration_failure(group: &str) {
    counter!(
        "catalog_query_enumeration_failures_total",
        "group" => group.to_string()
    )
    .increment(1);
}

/// A timing guard that records operation latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_query_latency(self.operation, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    #[test]
    fn test_api_does_not_panic_without_recorder() {
        record_query("query", "success");
        record_query_latency("query", Duration::from_millis(5));
        record_query_hits(42);
        record_compile(false);
        record_error("query", "backend_request_failed");
        set_schema_version(3);
        set_schema_attributes(120);
        record_schema_refresh("partial");
        record_enumeration_failure("ddf.distribution");
    }

    #[test]
    fn test_counters_reach_recorder() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_query("facet", "success");
            record_query("facet", "success");
            record_schema_refresh("success");
        });

        let snapshot = snapshotter.snapshot().into_vec();
        let operations = snapshot
            .iter()
            .find(|(key, _, _, _)| key.key().name() == "catalog_query_operations_total")
            .map(|(_, _, _, value)| value.clone());
        assert_eq!(operations, Some(&DebugValue::Counter(2)));
        assert!(snapshot
            .iter()
            .any(|(key, _, _, _)| key.key().name() == "catalog_query_schema_refresh_total"));
    }

    #[test]
    fn test_latency_timer_records_on_drop() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            let _timer = LatencyTimer::new("query");
            std::thread::sleep(Duration::from_micros(10));
        });

        let recorded = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .any(|(key, _, _, value)| {
                key.key().name() == "catalog_query_operation_seconds"
                    && matches!(value, DebugValue::Histogram(ref samples) if samples.len() == 1)
            });
        assert!(recorded);
    }
}
