//! Prometheus metrics for the dashboard service
//!
//! Covers the inbound HTTP surface, the upstream Qdrant and OpenAI calls,
//! and the collection scans that back the aggregation endpoints. Labels stay
//! low-cardinality: the route set is fixed and upstream endpoints are a
//! closed enum of static names.

use lazy_static::lazy_static;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Request Metrics
    // ============================================================================

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "dashboard_http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Total HTTP requests
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("dashboard_http_requests_total", "Total HTTP requests"),
        &["method", "endpoint", "status"]
    ).unwrap();

    // ============================================================================
    // Upstream Metrics
    // ============================================================================

    /// Qdrant API calls by endpoint and outcome
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("dashboard_upstream_requests_total", "Total Qdrant API calls"),
        &["endpoint", "result"]  // result: "ok" or "error"
    ).unwrap();

    /// Qdrant API call duration
    pub static ref UPSTREAM_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "dashboard_upstream_request_duration_seconds",
            "Qdrant API call duration"
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["endpoint"]
    ).unwrap();

    /// Scroll pages fetched during collection scans
    pub static ref SCROLL_PAGES_TOTAL: IntCounter = IntCounter::new(
        "dashboard_scroll_pages_total",
        "Total scroll pages fetched from the collection"
    ).unwrap();

    /// Embedding API calls by outcome
    pub static ref EMBEDDING_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("dashboard_embedding_requests_total", "Total embedding API calls"),
        &["result"]  // result: "ok" or "error"
    ).unwrap();

    // ============================================================================
    // Error Metrics
    // ============================================================================

    /// Error responses by error code
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("dashboard_errors_total", "Total error responses by code"),
        &["code"]
    ).unwrap();
}

/// Register all metrics with the global registry
pub fn register_metrics() -> Result<(), prometheus::Error> {
    METRICS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;

    METRICS_REGISTRY.register(Box::new(UPSTREAM_REQUESTS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(UPSTREAM_REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(SCROLL_PAGES_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(EMBEDDING_REQUESTS_TOTAL.clone()))?;

    METRICS_REGISTRY.register(Box::new(ERRORS_TOTAL.clone()))?;

    Ok(())
}

/// Helper to time operations with histogram (RAII pattern)
/// Usage: let _timer = Timer::new(SOME_HISTOGRAM.clone());
#[allow(unused)]  // Public API utility for metrics consumers
pub struct Timer {
    histogram: Histogram,
    start: std::time::Instant,
}

#[allow(unused)]  // Public API utility
impl Timer {
    /// Create timer that records duration to histogram on drop
    pub fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
