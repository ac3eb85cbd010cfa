//! Metrics and observability utilities
//!
//! Prometheus metrics with SLO-aligned histograms and standardized naming.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all AcademicWorld metrics
pub const METRICS_PREFIX: &str = "academicworld";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 250ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.100,  // 100ms
    0.250,  // 250ms - P99 target
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_keyword_searches_total", METRICS_PREFIX),
        Unit::Count,
        "Keyword ranking searches by outcome"
    );

    describe_histogram!(
        format!("{}_keyword_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Keyword ranking transaction latency in seconds"
    );

    describe_counter!(
        format!("{}_graph_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Graph store queries by name and outcome"
    );

    describe_histogram!(
        format!("{}_graph_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Graph store query latency in seconds"
    );

    describe_gauge!(
        format!("{}_graph_query_rows", METRICS_PREFIX),
        Unit::Count,
        "Rows returned by the last graph query"
    );

    describe_counter!(
        format!("{}_favorites_operations_total", METRICS_PREFIX),
        Unit::Count,
        "Favorites store operations by kind and category"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a keyword ranking search; outcome is ok, not_found, invalid, or error
pub fn record_keyword_search(duration_secs: f64, outcome: &'static str) {
    counter!(
        format!("{}_keyword_searches_total", METRICS_PREFIX),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        format!("{}_keyword_search_duration_seconds", METRICS_PREFIX),
        "outcome" => outcome
    )
    .record(duration_secs);
}

/// Record a graph query
pub fn record_graph_query(query: &'static str, duration_secs: f64, rows: Option<usize>) {
    let outcome = if rows.is_some() { "ok" } else { "error" };

    counter!(
        format!("{}_graph_queries_total", METRICS_PREFIX),
        "query" => query,
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        format!("{}_graph_query_duration_seconds", METRICS_PREFIX),
        "query" => query
    )
    .record(duration_secs);

    if let Some(rows) = rows {
        gauge!(
            format!("{}_graph_query_rows", METRICS_PREFIX),
            "query" => query
        )
        .set(rows as f64);
    }
}

/// Record a favorites store operation
pub fn record_favorites_op(operation: &'static str, category: Option<&'static str>) {
    counter!(
        format!("{}_favorites_operations_total", METRICS_PREFIX),
        "operation" => operation,
        "category" => category.unwrap_or("all")
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        assert!(LATENCY_BUCKETS.contains(&0.050));
        assert!(LATENCY_BUCKETS.contains(&0.250));
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: every helper is a no-op
        let metrics = RequestMetrics::start("POST", "/v1/search");
        metrics.finish(200);
        record_keyword_search(0.012, "not_found");
        record_graph_query("list_institutes", 0.003, Some(12));
        record_graph_query("citation_trend", 0.004, None);
        record_favorites_op("add", Some("topics"));
    }
}
