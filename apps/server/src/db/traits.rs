//! Storage seams for the search core
//!
//! The search service only ever talks to these traits. PostgreSQL and
//! in-memory implementations live next to them.

use crate::{
    db::search::QueryPlan,
    models::{Card, CardInput, SearchEvent},
    Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Rows for one page plus the unpaginated match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRows {
    pub cards: Vec<Card>,
    pub total: i64,
}

/// Card catalog storage.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Run a search plan.
    ///
    /// The caller short-circuits plans that cannot match, but implementations
    /// must still answer them with an empty result.
    async fn execute(&self, plan: &QueryPlan) -> Result<SearchRows>;

    async fn get(&self, id: i64) -> Result<Option<Card>>;

    async fn create(&self, input: &CardInput) -> Result<Card>;

    /// Replace a card's fields. `Ok(None)` when the card does not exist.
    async fn update(&self, id: i64, input: &CardInput) -> Result<Option<Card>>;

    /// `Ok(false)` when the card does not exist.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Destination for search analytics events.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn append(&self, event: &SearchEvent) -> Result<()>;
}

/// How often a filter appeared in recorded searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUsage {
    pub filter: String,
    pub count: i64,
}

/// Aggregate view over recorded searches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub since: DateTime<Utc>,
    pub total_searches: i64,
    pub cache_hits: i64,
    pub hit_rate: f64,
    pub avg_latency_ms: f64,
    pub popular_filters: Vec<FilterUsage>,
}

impl AnalyticsSummary {
    pub fn new(
        since: DateTime<Utc>,
        total_searches: i64,
        cache_hits: i64,
        avg_latency_ms: f64,
        popular_filters: Vec<FilterUsage>,
    ) -> Self {
        let hit_rate = if total_searches > 0 {
            cache_hits as f64 / total_searches as f64
        } else {
            0.0
        };
        Self {
            since,
            total_searches,
            cache_hits,
            hit_rate,
            avg_latency_ms,
            popular_filters,
        }
    }
}

/// Analytics sink that can also be queried.
#[async_trait]
pub trait AnalyticsStore: AnalyticsSink {
    /// Summarize events recorded at or after `since`, keeping the `top_n` most used filters.
    async fn summary(&self, since: DateTime<Utc>, top_n: usize) -> Result<AnalyticsSummary>;
}
