use crate::support::*;
use axum::http::StatusCode;
use std::time::Duration;

#[tokio::test]
async fn first_search_misses_then_hits() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let first = app.get("/api/cards/search?name=zaku").await?;
    let first_body = assert_json(&first, StatusCode::OK)?;
    assert_cache_status(&first, "MISS");
    let first_key = cache_key(&first)?;
    assert!(first
        .header("server-timing")
        .is_some_and(|v| v.starts_with("search;dur=")));

    let second = app.get("/api/cards/search?name=zaku").await?;
    let second_body = assert_json(&second, StatusCode::OK)?;
    assert_cache_status(&second, "HIT");
    assert_eq!(cache_key(&second)?, first_key);

    assert_eq!(first_body, second_body);
    assert_eq!(app.store.executions(), 1);
    Ok(())
}

#[tokio::test]
async fn equivalent_queries_share_one_entry() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let plain = app.get("/api/cards/search?name=Zaku").await?;
    assert_cache_status(&plain, "MISS");

    // Alias, padding, case and explicit defaults all normalize away.
    let spelled_out = app
        .get("/api/cards/search?search=%20%20zAKU%20&page=1&sortBy=name&sortOrder=ASC&includeRelations=false")
        .await?;
    assert_cache_status(&spelled_out, "HIT");
    assert_eq!(cache_key(&plain)?, cache_key(&spelled_out)?);

    // Parameter order never matters.
    let reordered = app.get("/api/cards/search?limit=20&name=zaku").await?;
    assert_cache_status(&reordered, "HIT");

    assert_eq!(app.store.executions(), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_parameters_do_not_change_the_key() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let plain = app.get("/api/cards/search?faction=zeon").await?;
    let noisy = app
        .get("/api/cards/search?faction=zeon&color=red&utm_source=newsletter")
        .await?;

    assert_cache_status(&noisy, "HIT");
    assert_eq!(cache_key(&plain)?, cache_key(&noisy)?);
    Ok(())
}

#[tokio::test]
async fn different_pages_are_cached_separately() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let page_one = app.get("/api/cards/search?limit=3&page=1").await?;
    let page_two = app.get("/api/cards/search?limit=3&page=2").await?;

    assert_cache_status(&page_one, "MISS");
    assert_cache_status(&page_two, "MISS");
    assert_ne!(cache_key(&page_one)?, cache_key(&page_two)?);
    assert_eq!(app.store.executions(), 2);
    Ok(())
}

#[tokio::test]
async fn admin_invalidation_forces_a_fresh_read() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    app.get("/api/cards/search?faction=federation").await?;
    let cached = app.get("/api/cards/search?faction=federation").await?;
    assert_cache_status(&cached, "HIT");

    let invalidated = app.post_empty("/admin/search-cache/invalidate").await?;
    let body = assert_json(&invalidated, StatusCode::OK)?;
    assert_eq!(body["invalidated"], true);
    assert_eq!(body["stats"]["entries"], 0);

    let fresh = app.get("/api/cards/search?faction=federation").await?;
    assert_cache_status(&fresh, "MISS");
    assert_eq!(app.store.executions(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn entries_expire_after_the_ttl() -> anyhow::Result<()> {
    let app = TestApp::seeded_with_config(|config| config.cache.ttl_seconds = 60).await?;

    app.get("/api/cards/search?name=gouf").await?;
    let within_ttl = app.get("/api/cards/search?name=gouf").await?;
    assert_cache_status(&within_ttl, "HIT");

    tokio::time::advance(Duration::from_secs(61)).await;

    let expired = app.get("/api/cards/search?name=gouf").await?;
    assert_cache_status(&expired, "MISS");
    assert_eq!(app.store.executions(), 2);
    Ok(())
}

#[tokio::test]
async fn disabled_cache_always_reads_the_store() -> anyhow::Result<()> {
    let app = TestApp::seeded_with_config(|config| config.cache.enabled = false).await?;

    let first = app.get("/api/cards/search?name=gm").await?;
    let second = app.get("/api/cards/search?name=gm").await?;

    assert_cache_status(&first, "MISS");
    assert_cache_status(&second, "MISS");
    // The key is still derived so clients can correlate requests.
    assert_eq!(cache_key(&first)?, cache_key(&second)?);
    assert_eq!(app.store.executions(), 2);
    Ok(())
}

#[tokio::test]
async fn capacity_evicts_least_recently_used() -> anyhow::Result<()> {
    let app = TestApp::seeded_with_config(|config| config.cache.capacity = 2).await?;

    app.get("/api/cards/search?name=zaku").await?;
    app.get("/api/cards/search?name=gouf").await?;
    // Touch zaku so gouf becomes the eviction candidate.
    app.get("/api/cards/search?name=zaku").await?;
    app.get("/api/cards/search?name=gm").await?;

    let zaku = app.get("/api/cards/search?name=zaku").await?;
    assert_cache_status(&zaku, "HIT");
    let gouf = app.get("/api/cards/search?name=gouf").await?;
    assert_cache_status(&gouf, "MISS");
    Ok(())
}
