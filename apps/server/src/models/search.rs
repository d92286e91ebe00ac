//! Search results and the analytics record of each search

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Card;
use crate::db::search::{CacheKey, NormalizedFilter, SearchOptions};

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultPage {
    pub items: Vec<Card>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl SearchResultPage {
    /// Build a page, truncating `items` to `limit` and deriving `total_pages`.
    pub fn new(mut items: Vec<Card>, total: i64, page: u32, limit: u32) -> Self {
        let limit = limit.max(1);
        items.truncate(limit as usize);
        let total = total.max(0);
        let total_pages = u32::try_from((total + limit as i64 - 1) / limit as i64).unwrap_or(u32::MAX);
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }

    pub fn empty(page: u32, limit: u32) -> Self {
        Self::new(Vec::new(), 0, page, limit)
    }
}

/// Who asked, and from where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContext {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub source: String,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self {
            session_id: None,
            user_id: None,
            source: "api".to_string(),
        }
    }
}

/// Append-only record of one completed search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    pub cache_key: CacheKey,
    pub filters: NormalizedFilter,
    pub options: SearchOptions,
    pub result_count: i64,
    pub latency_ms: u64,
    pub cache_hit: bool,
    pub context: SearchContext,
    pub timestamp: DateTime<Utc>,
}

impl SearchEvent {
    /// Canonical names of the filters this search used.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.canonical_fields().into_keys().collect()
    }
}
