//! Layer factories for middleware

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
};

use crate::api::handlers::{CACHE_KEY_HEADER, CACHE_STATUS_HEADER, SERVER_TIMING_HEADER};
use crate::request_context::{SEARCH_SOURCE_HEADER, SESSION_ID_HEADER, USER_ID_HEADER};

/// CORS for browser clients of the search API.
///
/// Without configured origins no CORS headers are emitted. Cache status and
/// request ids are exposed so a front end can show them.
pub fn cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if allowed.is_empty() {
        if !origins.is_empty() {
            tracing::warn!(?origins, "No valid CORS origins configured; CORS disabled");
        }
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(SESSION_ID_HEADER),
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(SEARCH_SOURCE_HEADER),
        ])
        .expose_headers([
            HeaderName::from_static(CACHE_STATUS_HEADER),
            HeaderName::from_static(CACHE_KEY_HEADER),
            HeaderName::from_static(SERVER_TIMING_HEADER),
            HeaderName::from_static("x-request-id"),
        ])
}

/// Compression middleware
pub fn compression() -> CompressionLayer {
    CompressionLayer::new()
}
