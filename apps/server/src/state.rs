//! Application state shared by all handlers

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::{
    cache::ResultCache,
    config::Config,
    db::{
        AnalyticsStore, CardStore, InMemoryAnalyticsStore, InMemoryCardStore,
        PostgresAnalyticsStore, PostgresCardStore,
    },
    services::{AnalyticsRecorder, AnalyticsWorker, CardService, SearchService},
    Error, Result,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when serving from the in-memory store.
    pub db_pool: Option<PgPool>,
    pub cache: Arc<ResultCache>,
    pub search_service: Arc<SearchService>,
    pub card_service: Arc<CardService>,
    pub analytics_store: Arc<dyn AnalyticsStore>,
}

impl AppState {
    /// Connect to the configured backend and wire up services.
    ///
    /// Returns the analytics worker separately so the caller can drain it on shutdown.
    pub async fn new(config: Config) -> Result<(Self, Option<AnalyticsWorker>)> {
        if config.database.in_memory {
            tracing::warn!("Using in-memory card store; data is not persisted");
            return Ok(Self::from_parts(
                config,
                None,
                Arc::new(InMemoryCardStore::new()),
                Arc::new(InMemoryAnalyticsStore::new()),
            ));
        }

        let pool = PgPoolOptions::new()
            .min_connections(config.database.pool_min_size)
            .max_connections(config.database.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.database.pool_timeout_seconds))
            .connect(&config.database.url)
            .await?;

        tracing::info!(
            max_connections = config.database.pool_max_size,
            "Database pool created"
        );

        if config.database.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| Error::Internal(format!("Failed to run migrations: {e}")))?;
            tracing::info!("Database migrations applied");
        }

        let card_store = Arc::new(PostgresCardStore::new(pool.clone()));
        let analytics_store = Arc::new(PostgresAnalyticsStore::new(pool.clone()));

        Ok(Self::from_parts(
            config,
            Some(pool),
            card_store,
            analytics_store,
        ))
    }

    /// Build state around explicit stores.
    pub fn from_parts(
        config: Config,
        db_pool: Option<PgPool>,
        card_store: Arc<dyn CardStore>,
        analytics_store: Arc<dyn AnalyticsStore>,
    ) -> (Self, Option<AnalyticsWorker>) {
        let cache = Arc::new(ResultCache::new(&config.cache));
        tracing::info!(
            enabled = config.cache.enabled,
            capacity = config.cache.capacity,
            ttl_seconds = config.cache.ttl_seconds,
            "Search result cache initialized"
        );

        let (recorder, worker) = if config.analytics.enabled {
            let (recorder, worker) =
                AnalyticsRecorder::spawn(analytics_store.clone(), &config.analytics);
            (recorder, Some(worker))
        } else {
            tracing::info!("Search analytics disabled");
            (AnalyticsRecorder::disabled(), None)
        };

        let search_service = Arc::new(SearchService::new(
            card_store.clone(),
            cache.clone(),
            recorder,
            &config.search,
        ));
        let card_service = Arc::new(CardService::new(card_store, cache.clone()));

        let state = Self {
            config: Arc::new(config),
            db_pool,
            cache,
            search_service,
            card_service,
            analytics_store,
        };
        (state, worker)
    }
}
