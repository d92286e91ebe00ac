//! Search context carried in request headers

use axum::http::HeaderMap;

use crate::models::SearchContext;

pub const SESSION_ID_HEADER: &str = "x-session-id";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const SEARCH_SOURCE_HEADER: &str = "x-search-source";

const MAX_CONTEXT_VALUE_LEN: usize = 128;

/// Build the analytics context of a search from its request headers.
///
/// Missing or unreadable headers are treated as absent; the source defaults to `api`.
pub fn search_context(headers: &HeaderMap) -> SearchContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| v.chars().take(MAX_CONTEXT_VALUE_LEN).collect::<String>())
    };

    let mut context = SearchContext {
        session_id: header(SESSION_ID_HEADER),
        user_id: header(USER_ID_HEADER),
        ..SearchContext::default()
    };
    if let Some(source) = header(SEARCH_SOURCE_HEADER) {
        context.source = source;
    }
    context
}
