use crate::support::*;
use axum::http::StatusCode;

#[tokio::test]
async fn summary_reports_searches_hits_and_popular_filters() -> anyhow::Result<()> {
    let mut app = TestApp::seeded().await?;

    app.get("/api/cards/search?name=zaku&faction=zeon").await?;
    app.get("/api/cards/search?name=zaku&faction=zeon").await?;
    app.get("/api/cards/search?name=gouf").await?;
    app.get("/api/cards/search?levelMin=3").await?;
    app.flush_analytics().await;

    let response = app.get("/admin/search-analytics?top=2").await?;
    let summary = assert_json(&response, StatusCode::OK)?;

    assert_eq!(summary["totalSearches"], 4);
    assert_eq!(summary["cacheHits"], 1);
    assert_eq!(summary["hitRate"], 0.25);

    let popular = summary["popularFilters"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("popularFilters is array"))?;
    assert_eq!(popular.len(), 2);
    assert_eq!(popular[0]["filter"], "name");
    assert_eq!(popular[0]["count"], 3);
    assert_eq!(popular[1]["filter"], "faction");
    assert_eq!(popular[1]["count"], 2);
    Ok(())
}

#[tokio::test]
async fn summary_of_no_searches_is_zeroed() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let response = app.get("/admin/search-analytics?sinceHours=nonsense").await?;
    let summary = assert_json(&response, StatusCode::OK)?;

    assert_eq!(summary["totalSearches"], 0);
    assert_eq!(summary["hitRate"], 0.0);
    assert_eq!(summary["popularFilters"], serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn events_carry_request_context() -> anyhow::Result<()> {
    let mut app = TestApp::seeded().await?;

    let response = app
        .get_with_headers(
            "/api/cards/search?name=amuro&limit=5",
            &[
                ("x-session-id", "session-42"),
                ("x-user-id", "user-7"),
                ("x-search-source", "deck-builder"),
            ],
        )
        .await?;
    let key = cache_key(&response)?;
    app.flush_analytics().await;

    let events = app.analytics.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.cache_key.as_str(), key);
    assert!(!event.cache_hit);
    assert_eq!(event.result_count, 1);
    assert_eq!(event.options.limit, 5);
    assert_eq!(event.filter_names(), vec!["name"]);
    assert_eq!(event.context.session_id.as_deref(), Some("session-42"));
    assert_eq!(event.context.user_id.as_deref(), Some("user-7"));
    assert_eq!(event.context.source, "deck-builder");
    Ok(())
}

#[tokio::test]
async fn failed_searches_are_not_recorded() -> anyhow::Result<()> {
    let mut app = TestApp::seeded().await?;
    app.store.set_unavailable(true);

    let response = app.get("/api/cards/search?name=gm").await?;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    app.flush_analytics().await;

    assert!(app.analytics.is_empty());
    Ok(())
}
