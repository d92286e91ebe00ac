//! Operational endpoints for the search cache and search analytics

use crate::{state::AppState, Result};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_SINCE_HOURS: i64 = 24;
const MAX_SINCE_HOURS: i64 = 24 * 366;
const DEFAULT_TOP: usize = 10;
const MAX_TOP: usize = 100;

/// POST /admin/search-cache/invalidate
pub async fn invalidate_search_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.cache.invalidate_all();
    tracing::info!(generation = state.cache.generation(), "Search cache invalidated by admin");
    Json(json!({
        "invalidated": true,
        "stats": state.cache.stats(),
    }))
}

/// GET /admin/search-cache/stats
pub async fn search_cache_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.cache.stats())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    since_hours: Option<String>,
    top: Option<String>,
}

impl AnalyticsQuery {
    /// Lenient like search input: bad numbers fall back to defaults.
    fn since_hours(&self) -> i64 {
        self.since_hours
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|h| h.clamp(1, MAX_SINCE_HOURS))
            .unwrap_or(DEFAULT_SINCE_HOURS)
    }

    fn top(&self) -> usize {
        self.top
            .as_deref()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map(|n| n.clamp(1, MAX_TOP))
            .unwrap_or(DEFAULT_TOP)
    }
}

/// GET /admin/search-analytics?sinceHours=&top=
pub async fn search_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse> {
    let since = Utc::now() - Duration::hours(query.since_hours());
    let summary = state.analytics_store.summary(since, query.top()).await?;
    Ok(Json(summary))
}
