//! Metrics collection for the CardVault server
//!
//! Prometheus metrics for HTTP traffic, the search path, the result cache and
//! the analytics recorder.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge, register_int_gauge_vec, Histogram, HistogramVec, IntCounter,
    IntCounterVec, IntGauge, IntGaugeVec,
};

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cardvault_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "cardvault_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    /// In-flight HTTP requests
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "cardvault_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    // Search Metrics

    /// Searches by cache outcome (hit/miss) and status (success/error)
    pub static ref SEARCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cardvault_search_total",
        "Total number of card searches",
        &["cache", "status"]
    )
    .expect("Failed to register SEARCH_TOTAL");

    /// End-to-end search latency
    pub static ref SEARCH_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "cardvault_search_duration_seconds",
        "Card search duration in seconds",
        &["cache"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    )
    .expect("Failed to register SEARCH_DURATION_SECONDS");

    /// Total matches per search
    pub static ref SEARCH_RESULTS: Histogram = register_histogram!(
        "cardvault_search_results",
        "Number of cards matched by a search",
        vec![0.0, 1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 10000.0]
    )
    .expect("Failed to register SEARCH_RESULTS");

    // Cache Metrics

    pub static ref SEARCH_CACHE_ENTRIES: IntGauge = register_int_gauge!(
        "cardvault_search_cache_entries",
        "Number of result pages held in the search cache"
    )
    .expect("Failed to register SEARCH_CACHE_ENTRIES");

    pub static ref SEARCH_CACHE_EVICTIONS_TOTAL: IntCounter = register_int_counter!(
        "cardvault_search_cache_evictions_total",
        "Search cache entries evicted to stay within capacity"
    )
    .expect("Failed to register SEARCH_CACHE_EVICTIONS_TOTAL");

    pub static ref SEARCH_CACHE_INVALIDATIONS_TOTAL: IntCounter = register_int_counter!(
        "cardvault_search_cache_invalidations_total",
        "Full search cache invalidations"
    )
    .expect("Failed to register SEARCH_CACHE_INVALIDATIONS_TOTAL");

    // Analytics Metrics

    /// Analytics events by outcome (queued, dropped, written, failed)
    pub static ref ANALYTICS_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cardvault_analytics_events_total",
        "Search analytics events by outcome",
        &["outcome"]
    )
    .expect("Failed to register ANALYTICS_EVENTS_TOTAL");

    // Database Metrics

    /// Connections in the pool
    pub static ref DB_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        "cardvault_db_connections_active",
        "Number of open database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_ACTIVE");

    /// Idle database connections
    pub static ref DB_CONNECTIONS_IDLE: IntGauge = register_int_gauge!(
        "cardvault_db_connections_idle",
        "Number of idle database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_IDLE");
}

/// Helper to sanitize path for metrics labels (replace ids, limit cardinality)
pub fn sanitize_path(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }

    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .take(4)
        .map(|s| {
            if s.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                s
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}
