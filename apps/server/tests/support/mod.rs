#![allow(dead_code)]

pub mod builders;
pub mod fixtures;
pub mod shared;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use cardvault::{
    api::create_router,
    db::{InMemoryAnalyticsStore, InMemoryCardStore},
    services::AnalyticsWorker,
    AppState, Config,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt as _;

// Re-export commonly used items
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<InMemoryCardStore>,
    pub analytics: Arc<InMemoryAnalyticsStore>,
    analytics_worker: Option<AnalyticsWorker>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> anyhow::Result<Value> {
        serde_json::from_slice(&self.body).context("parse response body as JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    /// App over an empty in-memory store.
    pub async fn new() -> anyhow::Result<Self> {
        Self::new_with_config(|_| {}).await
    }

    pub async fn new_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        shared::init_tracing();

        let mut config = shared::base_config();
        configure(&mut config);
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid test config: {e}"))?;

        let store = Arc::new(InMemoryCardStore::new());
        let analytics = Arc::new(InMemoryAnalyticsStore::new());
        let (state, analytics_worker) =
            AppState::from_parts(config, None, store.clone(), analytics.clone());
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            store,
            analytics,
            analytics_worker,
        })
    }

    /// App pre-loaded with the standard catalog from `fixtures`.
    pub async fn seeded() -> anyhow::Result<Self> {
        Self::seeded_with_config(|_| {}).await
    }

    pub async fn seeded_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let app = Self::new_with_config(configure).await?;
        seed_catalog(&app.store).await;
        Ok(app)
    }

    /// Stop the analytics worker after it has written every queued event.
    pub async fn flush_analytics(&mut self) {
        if let Some(worker) = self.analytics_worker.take() {
            worker.shutdown().await;
        }
    }

    pub async fn get(&self, path_and_query: &str) -> anyhow::Result<TestResponse> {
        self.request(Method::GET, path_and_query, None, &[]).await
    }

    pub async fn get_with_headers(
        &self,
        path_and_query: &str,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<TestResponse> {
        self.request(Method::GET, path_and_query, None, extra_headers)
            .await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> anyhow::Result<TestResponse> {
        self.request(Method::POST, path, Some(to_json_body(body)?), &[])
            .await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> anyhow::Result<TestResponse> {
        self.request(Method::PUT, path, Some(to_json_body(body)?), &[])
            .await
    }

    pub async fn post_empty(&self, path: &str) -> anyhow::Result<TestResponse> {
        self.request(Method::POST, path, None, &[]).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<TestResponse> {
        self.request(Method::DELETE, path, None, &[]).await
    }

    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<TestResponse> {
        let mut request = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header("host", "example.org")
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .body(match body {
                Some(bytes) => Body::from(bytes),
                None => Body::empty(),
            })
            .context("build request")?;

        for (name, value) in extra_headers {
            request.headers_mut().insert(
                name.parse::<HeaderName>().context("parse header name")?,
                value.parse::<HeaderValue>().context("parse header value")?,
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }
}
