//! Search service - cached card search
//!
//! Orchestrates one search:
//! - normalizing filters and options
//! - deriving the cache key and serving hits from the result cache
//! - planning and executing the query on a miss, bounded by the query timeout
//! - handing a `SearchEvent` to the analytics recorder

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use crate::{
    cache::ResultCache,
    config::SearchConfig,
    db::search::{
        split_query_items, CacheKey, NormalizedFilter, QueryPlan, SearchLimits, SearchOptions,
    },
    db::traits::{CardStore, SearchRows},
    metrics,
    models::{SearchContext, SearchEvent, SearchResultPage},
    services::analytics::AnalyticsRecorder,
    Error, Result,
};

/// Result of one search, with enough context for response headers.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub page: Arc<SearchResultPage>,
    pub cache_hit: bool,
    pub cache_key: CacheKey,
    pub latency_ms: u64,
}

/// Single entry point for card searches
pub struct SearchService {
    store: Arc<dyn CardStore>,
    cache: Arc<ResultCache>,
    analytics: AnalyticsRecorder,
    limits: SearchLimits,
    query_timeout: Duration,
}

impl SearchService {
    pub fn new(
        store: Arc<dyn CardStore>,
        cache: Arc<ResultCache>,
        analytics: AnalyticsRecorder,
        config: &SearchConfig,
    ) -> Self {
        Self {
            store,
            cache,
            analytics,
            limits: SearchLimits::from(config),
            query_timeout: config.query_timeout(),
        }
    }

    /// Search with a mixed list of query-string items (filters and options together).
    pub async fn search_items(
        &self,
        items: &[(String, String)],
        context: SearchContext,
    ) -> Result<SearchOutcome> {
        let (filters, options) = split_query_items(items);
        self.search(&filters, &options, context).await
    }

    /// Search cards.
    ///
    /// Serves from the result cache when possible. Store failures and timeouts
    /// are returned as retryable errors and never cached.
    #[tracing::instrument(name = "card_search", skip_all, fields(cache_key, cache_hit))]
    pub async fn search(
        &self,
        raw_filters: &HashMap<String, String>,
        raw_options: &HashMap<String, String>,
        context: SearchContext,
    ) -> Result<SearchOutcome> {
        let started = Instant::now();

        let filters = NormalizedFilter::from_raw(raw_filters);
        let options = SearchOptions::from_raw(raw_options, &self.limits);
        let cache_key = CacheKey::derive(&filters, &options);

        let span = tracing::Span::current();
        span.record("cache_key", tracing::field::display(&cache_key));

        if let Some(page) = self.cache.get(&cache_key) {
            span.record("cache_hit", true);
            let latency = started.elapsed();
            self.finish(&cache_key, filters, options, &page, true, latency, context);
            return Ok(SearchOutcome {
                page,
                cache_hit: true,
                cache_key,
                latency_ms: latency.as_millis() as u64,
            });
        }
        span.record("cache_hit", false);

        // Read before querying so an invalidation during the query discards the result.
        let generation = self.cache.generation();
        let plan = QueryPlan::build(&filters, &options);

        let rows = match self.execute(&plan).await {
            Ok(rows) => rows,
            Err(e) => {
                metrics::SEARCH_TOTAL
                    .with_label_values(&["miss", "error"])
                    .inc();
                tracing::warn!(cache_key = %cache_key, error = %e, "Card search failed");
                return Err(e);
            }
        };

        let page = Arc::new(SearchResultPage::new(
            rows.cards,
            rows.total,
            options.page,
            options.limit,
        ));

        if !self
            .cache
            .insert_if_generation(cache_key.clone(), Arc::clone(&page), None, generation)
            && self.cache.is_enabled()
        {
            tracing::debug!(cache_key = %cache_key, "Cache invalidated during query; result not cached");
        }

        let latency = started.elapsed();
        self.finish(&cache_key, filters, options, &page, false, latency, context);

        Ok(SearchOutcome {
            page,
            cache_hit: false,
            cache_key,
            latency_ms: latency.as_millis() as u64,
        })
    }

    async fn execute(&self, plan: &QueryPlan) -> Result<SearchRows> {
        if plan.is_empty_result() {
            tracing::debug!("Filter can never match; skipping data store");
            return Ok(SearchRows::default());
        }

        match tokio::time::timeout(self.query_timeout, self.store.execute(plan)).await {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(e)) if e.is_retryable() => Err(e),
            Ok(Err(e)) => Err(Error::DataAccess(e.to_string())),
            Err(_) => Err(Error::QueryTimeout(self.query_timeout)),
        }
    }

    fn finish(
        &self,
        cache_key: &CacheKey,
        filters: NormalizedFilter,
        options: SearchOptions,
        page: &SearchResultPage,
        cache_hit: bool,
        latency: Duration,
        context: SearchContext,
    ) {
        let cache_label = if cache_hit { "hit" } else { "miss" };
        metrics::SEARCH_TOTAL
            .with_label_values(&[cache_label, "success"])
            .inc();
        metrics::SEARCH_DURATION_SECONDS
            .with_label_values(&[cache_label])
            .observe(latency.as_secs_f64());
        metrics::SEARCH_RESULTS.observe(page.total as f64);

        tracing::debug!(
            cache_key = %cache_key,
            cache_hit,
            total = page.total,
            latency_ms = latency.as_millis() as u64,
            "Card search completed"
        );

        self.analytics.record(SearchEvent {
            cache_key: cache_key.clone(),
            filters,
            options,
            result_count: page.total,
            latency_ms: latency.as_millis() as u64,
            cache_hit,
            context,
            timestamp: Utc::now(),
        });
    }
}
