use crate::support::*;
use axum::http::StatusCode;

#[tokio::test]
async fn stats_track_hits_and_misses() -> anyhow::Result<()> {
    let app = TestApp::seeded_with_config(|config| {
        config.cache.capacity = 50;
        config.cache.ttl_seconds = 120;
    })
    .await?;

    app.get("/api/cards/search?name=zaku").await?;
    app.get("/api/cards/search?name=zaku").await?;
    app.get("/api/cards/search?name=gouf").await?;

    let response = app.get("/admin/search-cache/stats").await?;
    let stats = assert_json(&response, StatusCode::OK)?;

    assert_eq!(stats["enabled"], true);
    assert_eq!(stats["capacity"], 50);
    assert_eq!(stats["ttlSeconds"], 120);
    assert_eq!(stats["entries"], 2);
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 2);
    assert_eq!(stats["generation"], 0);
    Ok(())
}

#[tokio::test]
async fn invalidation_bumps_the_generation() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;
    app.get("/api/cards/search?name=gm").await?;

    let first = app.post_empty("/admin/search-cache/invalidate").await?;
    let first = assert_json(&first, StatusCode::OK)?;
    let second = app.post_empty("/admin/search-cache/invalidate").await?;
    let second = assert_json(&second, StatusCode::OK)?;

    assert_eq!(first["stats"]["generation"], 1);
    assert_eq!(second["stats"]["generation"], 2);
    assert_eq!(second["stats"]["invalidations"], 2);
    assert_eq!(second["stats"]["entries"], 0);
    Ok(())
}

#[tokio::test]
async fn invalidate_requires_post() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let response = app.get("/admin/search-cache/invalidate").await?;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}
