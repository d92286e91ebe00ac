//! Admin API Routes

use crate::api::handlers::admin;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/search-cache/invalidate",
            post(admin::invalidate_search_cache),
        )
        .route("/search-cache/stats", get(admin::search_cache_stats))
        .route("/search-analytics", get(admin::search_analytics))
}
