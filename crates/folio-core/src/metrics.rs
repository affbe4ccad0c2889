//! Cache and operation metrics.
//!
//! Recorded through the `metrics` facade; the service installs a Prometheus
//! recorder. Without a recorder every call is a no-op.
//!
//! # Metrics
//!
//! - `folio_cache_hits_total` - listing pages served from cache
//! - `folio_cache_misses_total` - listing pages loaded from the store
//! - `folio_cache_errors_total` - cache failures by operation (`get`, `set`, `decode`, `encode`)
//! - `folio_cache_invalidations_total` - successful clears after a write
//! - `folio_cache_invalidation_failures_total` - writes whose clear gave up
//! - `folio_operation_duration_seconds` - service operation latency by operation and result

use std::time::Instant;

use metrics::{counter, histogram};

pub const CACHE_HITS_TOTAL: &str = "folio_cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "folio_cache_misses_total";
pub const CACHE_ERRORS_TOTAL: &str = "folio_cache_errors_total";
pub const CACHE_INVALIDATIONS_TOTAL: &str = "folio_cache_invalidations_total";
pub const CACHE_INVALIDATION_FAILURES_TOTAL: &str = "folio_cache_invalidation_failures_total";
pub const OPERATION_DURATION_SECONDS: &str = "folio_operation_duration_seconds";

/// Cache operation that failed, for the `operation` label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOp {
    Get,
    Set,
    Decode,
    Encode,
    Clear,
}

impl CacheOp {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::Clear => "clear",
        }
    }
}

pub fn record_cache_hit() {
    counter!(CACHE_HITS_TOTAL).increment(1);
}

pub fn record_cache_miss() {
    counter!(CACHE_MISSES_TOTAL).increment(1);
}

pub fn record_cache_error(op: CacheOp) {
    counter!(CACHE_ERRORS_TOTAL, "operation" => op.as_str()).increment(1);
}

pub fn record_invalidation() {
    counter!(CACHE_INVALIDATIONS_TOTAL).increment(1);
}

pub fn record_invalidation_failure() {
    counter!(CACHE_INVALIDATION_FAILURES_TOTAL).increment(1);
}

/// Times one service operation
#[derive(Debug)]
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    #[must_use]
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Record the elapsed time under `result` (`ok` or an error code)
    pub fn finish(self, result: &'static str) -> f64 {
        let elapsed = self.start.elapsed().as_secs_f64();
        histogram!(
            OPERATION_DURATION_SECONDS,
            "operation" => self.operation,
            "result" => result
        )
        .record(elapsed);
        elapsed
    }
}

/// Register metric descriptions with the installed recorder.
///
/// Call once during startup, after installing the recorder.
pub fn describe_metrics() {
    use metrics::{describe_counter, describe_histogram, Unit};

    describe_counter!(
        CACHE_HITS_TOTAL,
        Unit::Count,
        "Article listing pages served from cache"
    );
    describe_counter!(
        CACHE_MISSES_TOTAL,
        Unit::Count,
        "Article listing pages loaded from the database"
    );
    describe_counter!(
        CACHE_ERRORS_TOTAL,
        Unit::Count,
        "Cache failures, labelled by operation"
    );
    describe_counter!(
        CACHE_INVALIDATIONS_TOTAL,
        Unit::Count,
        "Listing cache clears after a write"
    );
    describe_counter!(
        CACHE_INVALIDATION_FAILURES_TOTAL,
        Unit::Count,
        "Writes whose listing cache clear failed after all retries"
    );
    describe_histogram!(
        OPERATION_DURATION_SECONDS,
        Unit::Seconds,
        "Duration of Folio operations in seconds"
    );
}
