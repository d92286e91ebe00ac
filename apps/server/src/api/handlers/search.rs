//! Card search handler
//!
//! GET /api/cards/search?{filters}&{options}
//!
//! Search input is permissive: unknown or malformed parameters are dropped
//! during normalization, never rejected.

use crate::{request_context, state::AppState, Result};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

pub const CACHE_STATUS_HEADER: &str = "x-cache";
pub const CACHE_KEY_HEADER: &str = "x-cache-key";
pub const SERVER_TIMING_HEADER: &str = "server-timing";

pub async fn search_cards(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(items): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let context = request_context::search_context(&headers);
    let outcome = state.search_service.search_items(&items, context).await?;

    let mut response = Json(outcome.page.as_ref()).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(
        CACHE_STATUS_HEADER,
        HeaderValue::from_static(if outcome.cache_hit { "HIT" } else { "MISS" }),
    );
    if let Ok(value) = HeaderValue::from_str(outcome.cache_key.as_str()) {
        response_headers.insert(CACHE_KEY_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("search;dur={}", outcome.latency_ms)) {
        response_headers.insert(SERVER_TIMING_HEADER, value);
    }

    Ok(response)
}
