//! Prometheus scrape endpoint

use crate::api::handlers::metrics;
use crate::state::AppState;
use axum::{routing::get, Router};

/// `GET /metrics` in the Prometheus text exposition format.
pub fn metrics_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics::metrics_handler))
}
