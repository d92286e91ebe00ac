//! PostgreSQL analytics store on the `search_events` table

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};

use super::traits::{AnalyticsSink, AnalyticsStore, AnalyticsSummary, FilterUsage};
use crate::models::SearchEvent;
use crate::Result;

#[derive(Clone)]
pub struct PostgresAnalyticsStore {
    pool: PgPool,
}

impl PostgresAnalyticsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsSink for PostgresAnalyticsStore {
    async fn append(&self, event: &SearchEvent) -> Result<()> {
        let filter_names: Vec<String> = event
            .filter_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        sqlx::query(
            "INSERT INTO search_events \
             (cache_key, filters, options, filter_names, result_count, latency_ms, cache_hit, \
              session_id, user_id, source, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(event.cache_key.as_str())
        .bind(Json(&event.filters))
        .bind(Json(&event.options))
        .bind(filter_names)
        .bind(event.result_count)
        .bind(i64::try_from(event.latency_ms).unwrap_or(i64::MAX))
        .bind(event.cache_hit)
        .bind(&event.context.session_id)
        .bind(&event.context.user_id)
        .bind(&event.context.source)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AnalyticsStore for PostgresAnalyticsStore {
    async fn summary(&self, since: DateTime<Utc>, top_n: usize) -> Result<AnalyticsSummary> {
        let (total, hits, avg_latency): (i64, i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE cache_hit), \
                    COALESCE(AVG(latency_ms)::float8, 0) \
             FROM search_events WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        let popular: Vec<(String, i64)> = sqlx::query_as(
            "SELECT f, COUNT(*) AS uses \
             FROM search_events, unnest(filter_names) AS f \
             WHERE created_at >= $1 \
             GROUP BY f ORDER BY uses DESC, f ASC LIMIT $2",
        )
        .bind(since)
        .bind(i64::try_from(top_n).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let popular_filters = popular
            .into_iter()
            .map(|(filter, count)| FilterUsage { filter, count })
            .collect();

        Ok(AnalyticsSummary::new(
            since,
            total,
            hits,
            avg_latency,
            popular_filters,
        ))
    }
}
