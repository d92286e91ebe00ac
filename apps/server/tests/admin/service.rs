use crate::support::*;
use axum::http::StatusCode;

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let response = app.get("/health").await?;
    let body = assert_json(&response, StatusCode::OK)?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_storage_and_cache() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let response = app.get("/").await?;
    let body = assert_json(&response, StatusCode::OK)?;
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["cache"]["enabled"], true);
    Ok(())
}

#[tokio::test]
async fn responses_carry_a_request_id() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let generated = app.get("/health").await?;
    assert!(generated.header("x-request-id").is_some());

    // The server always mints its own id and echoes the client's as a correlation id.
    let echoed = app
        .get_with_headers("/health", &[("x-request-id", "req-123")])
        .await?;
    assert_ne!(echoed.header("x-request-id"), Some("req-123"));
    assert_eq!(echoed.header("x-correlation-id"), Some("req-123"));
    Ok(())
}

#[tokio::test]
async fn metrics_expose_search_counters() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;
    app.get("/api/cards/search?name=zaku").await?;

    let response = app.get("/metrics").await?;
    assert_eq!(response.status, StatusCode::OK);
    let text = String::from_utf8_lossy(&response.body);
    assert!(text.contains("cardvault_search_total"));
    assert!(text.contains("cardvault_search_cache_entries"));
    Ok(())
}
