mod common;

use common::{USER_ID_HEADER, seed_link, spawn_app};
use linkhub::domain::repositories::LinkStore;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_update_link_url() {
    let owner = Uuid::new_v4();
    let app = spawn_app();
    seed_link(&app.links, "patchme1", "https://example.com/old", true, Some(owner)).await;

    let response = app
        .server
        .patch("/api/links/patchme1")
        .add_header(USER_ID_HEADER, owner.to_string())
        .json(&json!({ "original_url": "https://example.com/new" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["original_url"], "https://example.com/new");
}

#[tokio::test]
async fn test_update_requires_write_access() {
    let app = spawn_app();
    seed_link(
        &app.links,
        "patchme1",
        "https://example.com",
        true,
        Some(Uuid::new_v4()),
    )
    .await;

    let anonymous = app
        .server
        .patch("/api/links/patchme1")
        .json(&json!({ "is_public": false }))
        .await;
    assert_eq!(anonymous.status_code(), 403);

    let stranger = app
        .server
        .patch("/api/links/patchme1")
        .add_header(USER_ID_HEADER, Uuid::new_v4().to_string())
        .json(&json!({ "is_public": false }))
        .await;
    assert_eq!(stranger.status_code(), 403);
}

#[tokio::test]
async fn test_empty_patch_rejected() {
    let owner = Uuid::new_v4();
    let app = spawn_app();
    seed_link(&app.links, "patchme1", "https://example.com", true, Some(owner)).await;

    let response = app
        .server
        .patch("/api/links/patchme1")
        .add_header(USER_ID_HEADER, owner.to_string())
        .json(&json!({}))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_privacy_downgrade_takes_effect_immediately() {
    let owner = Uuid::new_v4();
    let app = spawn_app();
    seed_link(&app.links, "flipme01", "https://example.com", true, Some(owner)).await;

    // resolve once so the static region holds the public version
    let before = app.server.get("/flipme01").await;
    assert_eq!(before.status_code(), 307);

    let patched = app
        .server
        .patch("/api/links/flipme01")
        .add_header(USER_ID_HEADER, owner.to_string())
        .json(&json!({ "is_public": false }))
        .await;
    assert_eq!(patched.status_code(), 200);

    // no TTL window: the very next anonymous resolution is masked
    let after = app.server.get("/flipme01").await;
    assert_eq!(after.status_code(), 404);
}

#[tokio::test]
async fn test_delete_link() {
    let owner = Uuid::new_v4();
    let app = spawn_app();
    seed_link(&app.links, "deleteme", "https://example.com", true, Some(owner)).await;
    // warm the static region
    app.server.get("/deleteme").await;

    let response = app
        .server
        .delete("/api/links/deleteme")
        .add_header(USER_ID_HEADER, owner.to_string())
        .await;
    assert_eq!(response.status_code(), 204);

    // both the store row and the cached entry are gone
    let after = app.server.get("/deleteme").await;
    assert_eq!(after.status_code(), 404);
}

#[tokio::test]
async fn test_list_my_links() {
    let owner = Uuid::new_v4();
    let app = spawn_app();
    seed_link(&app.links, "mine0001", "https://example.com/1", true, Some(owner)).await;
    seed_link(&app.links, "mine0002", "https://example.com/2", false, Some(owner)).await;
    seed_link(&app.links, "other001", "https://example.com/3", true, None).await;

    let response = app
        .server
        .get("/api/links")
        .add_header(USER_ID_HEADER, owner.to_string())
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["links"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_requires_authentication() {
    let app = spawn_app();
    let response = app.server.get("/api/links").await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_search_scopes_to_requester() {
    let owner = Uuid::new_v4();
    let app = spawn_app();
    seed_link(
        &app.links,
        "pub00001",
        "https://example.com/docs/intro",
        true,
        None,
    )
    .await;
    seed_link(
        &app.links,
        "priv0001",
        "https://example.com/docs/private",
        false,
        Some(owner),
    )
    .await;

    let anonymous = app.server.get("/api/links/search?q=docs").await;
    assert_eq!(anonymous.status_code(), 200);
    let body: serde_json::Value = anonymous.json();
    assert_eq!(body["links"].as_array().unwrap().len(), 1);

    let owned = app
        .server
        .get("/api/links/search?q=docs")
        .add_header(USER_ID_HEADER, owner.to_string())
        .await;
    let body: serde_json::Value = owned.json();
    assert_eq!(body["links"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_popular_lists_public_links_by_clicks() {
    let app = spawn_app();
    seed_link(&app.links, "hot00001", "https://example.com/hot", true, None).await;
    seed_link(&app.links, "cold0001", "https://example.com/cold", true, None).await;
    seed_link(
        &app.links,
        "priv0001",
        "https://example.com/private",
        false,
        Some(Uuid::new_v4()),
    )
    .await;
    app.links
        .increment_clicks("hot00001", 10, chrono::Utc::now())
        .await
        .unwrap();

    let response = app.server.get("/api/links/popular?limit=10").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["short_code"], "hot00001");
    assert_eq!(entries[0]["clicks_count"], 10);
}
