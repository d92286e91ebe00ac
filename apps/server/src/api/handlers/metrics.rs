//! Metrics endpoint handler
//!
//! Exposes Prometheus-compatible metrics for monitoring

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use prometheus::{Encoder, TextEncoder};

use crate::state::AppState;

/// Handler for /metrics endpoint
/// Returns Prometheus text format metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    // Gauges sampled at scrape time
    crate::metrics::SEARCH_CACHE_ENTRIES.set(state.cache.len() as i64);
    if let Some(pool) = &state.db_pool {
        let idle = pool.num_idle();
        crate::metrics::DB_CONNECTIONS_ACTIVE.set(checked_out_connections(pool.size(), idle));
        crate::metrics::DB_CONNECTIONS_IDLE.set(idle as i64);
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("Content-Type", "text/plain")],
                b"Failed to encode metrics".to_vec(),
            )
        }
    }
}

/// Connections currently lent out: open minus idle.
fn checked_out_connections(open: u32, idle: usize) -> i64 {
    (open as i64 - idle as i64).max(0)
}
