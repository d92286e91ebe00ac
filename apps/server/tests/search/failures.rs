use crate::support::*;
use axum::http::StatusCode;
use std::time::Duration;

#[tokio::test]
async fn store_failure_is_retryable_and_not_cached() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;
    app.store.set_unavailable(true);

    let failed = app.get("/api/cards/search?name=gm").await?;
    let body = assert_json(&failed, StatusCode::SERVICE_UNAVAILABLE)?;
    assert_eq!(failed.header("retry-after"), Some("1"));
    assert_eq!(body["error"]["retryable"], true);
    assert_eq!(body["error"]["code"], "unavailable");

    app.store.set_unavailable(false);

    let retried = app.get("/api/cards/search?name=gm").await?;
    let body = assert_json(&retried, StatusCode::OK)?;
    assert_cache_status(&retried, "MISS");
    assert_eq!(item_ids(&body)?, vec![ids::GM]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn slow_store_times_out() -> anyhow::Result<()> {
    let app = TestApp::seeded_with_config(|config| config.search.query_timeout_ms = 50).await?;
    app.store.set_latency(Duration::from_secs(5));

    let response = app.get("/api/cards/search?name=gouf").await?;
    assert_json(&response, StatusCode::SERVICE_UNAVAILABLE)?;
    assert_eq!(response.header("retry-after"), Some("1"));

    let stats = app.get("/admin/search-cache/stats").await?;
    let stats = assert_json(&stats, StatusCode::OK)?;
    assert_eq!(stats["entries"], 0);
    Ok(())
}

#[tokio::test]
async fn analytics_failure_does_not_affect_search() -> anyhow::Result<()> {
    let mut app = TestApp::seeded().await?;
    app.analytics.set_failing(true);

    let response = app.get("/api/cards/search?name=zaku").await?;
    let body = assert_json(&response, StatusCode::OK)?;
    assert_eq!(body["total"], 3);

    app.flush_analytics().await;
    assert!(app.analytics.is_empty());
    Ok(())
}

#[tokio::test]
async fn disabled_analytics_records_nothing() -> anyhow::Result<()> {
    let mut app = TestApp::seeded_with_config(|config| config.analytics.enabled = false).await?;

    let response = app.get("/api/cards/search?name=zaku").await?;
    assert_json(&response, StatusCode::OK)?;

    app.flush_analytics().await;
    assert!(app.analytics.is_empty());
    Ok(())
}
