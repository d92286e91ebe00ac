use crate::support::*;
use axum::http::StatusCode;
use std::collections::BTreeSet;

async fn search_ids(app: &TestApp, query: &str) -> anyhow::Result<BTreeSet<i64>> {
    let response = app.get(&format!("/api/cards/search?{query}")).await?;
    let body = assert_json(&response, StatusCode::OK)?;
    Ok(item_ids(&body)?.into_iter().collect())
}

#[tokio::test]
async fn name_matches_substring_case_insensitively() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let found = search_ids(&app, "name=ZAKU").await?;
    assert_eq!(
        found,
        BTreeSet::from([ids::ZAKU_II, ids::CHARS_ZAKU, ids::ZAKU_WARRIOR])
    );
    Ok(())
}

#[tokio::test]
async fn filters_combine_with_and() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let found = search_ids(&app, "faction=zeon&levelMin=4").await?;
    assert_eq!(found, BTreeSet::from([ids::CHARS_ZAKU, ids::GOUF]));

    let found = search_ids(&app, "faction=Federation&typeId=1&rarityId=3").await?;
    assert_eq!(found, BTreeSet::from([ids::GUNDAM]));
    Ok(())
}

#[tokio::test]
async fn ranges_are_inclusive() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let found = search_ids(&app, "costMin=2&costMax=3").await?;
    assert_eq!(
        found,
        BTreeSet::from([ids::ZAKU_II, ids::CHARS_ZAKU, ids::GOUF, ids::ZAKU_WARRIOR])
    );

    // Cards without a level never satisfy a level bound.
    let found = search_ids(&app, "levelMax=2").await?;
    assert_eq!(found, BTreeSet::from([ids::GM]));
    Ok(())
}

#[tokio::test]
async fn id_aliases_resolve_to_the_same_filter() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let by_alias = search_ids(&app, "type=2").await?;
    let by_name = search_ids(&app, "typeId=2").await?;
    assert_eq!(by_alias, BTreeSet::from([ids::WHITE_BASE]));
    assert_eq!(by_alias, by_name);

    let found = search_ids(&app, "set_id=3").await?;
    assert_eq!(found, BTreeSet::from([ids::ZAKU_WARRIOR]));
    Ok(())
}

#[tokio::test]
async fn malformed_values_are_dropped() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let found = search_ids(&app, "levelMin=abc&typeId=&faction=%20%20").await?;
    assert_eq!(found.len() as i64, CATALOG_SIZE);
    Ok(())
}

#[tokio::test]
async fn inverted_range_returns_empty_page_without_store_call() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let response = app.get("/api/cards/search?levelMin=5&levelMax=2").await?;
    let body = assert_json(&response, StatusCode::OK)?;

    assert_eq!(page_meta(&body)?, (0, 1, 20, 0));
    assert!(item_ids(&body)?.is_empty());
    assert_eq!(app.store.executions(), 0);
    Ok(())
}

#[tokio::test]
async fn wildcards_in_names_match_literally() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    assert!(search_ids(&app, "name=%25").await?.is_empty());
    assert!(search_ids(&app, "name=z_ku").await?.is_empty());

    let found = search_ids(&app, "name=char%27s").await?;
    assert_eq!(found, BTreeSet::from([ids::CHARS_ZAKU]));
    Ok(())
}

#[tokio::test]
async fn relations_are_included_only_on_request() -> anyhow::Result<()> {
    let app = TestApp::seeded().await?;

    let response = app.get("/api/cards/search?name=white%20base").await?;
    let body = assert_json(&response, StatusCode::OK)?;
    assert!(body["items"][0].get("relations").is_none());

    let response = app
        .get("/api/cards/search?name=white%20base&includeRelations=true")
        .await?;
    let body = assert_json(&response, StatusCode::OK)?;
    let relations = &body["items"][0]["relations"];
    assert_eq!(relations["typeName"], "Ship");
    assert_eq!(relations["rarityName"], "Rare");
    assert_eq!(relations["setName"], "Operation V");
    Ok(())
}
