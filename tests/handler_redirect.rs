mod common;

use common::{USER_ID_HEADER, seed_expired_link, seed_link, spawn_app};
use linkhub::domain::repositories::LinkStore;
use uuid::Uuid;

#[tokio::test]
async fn test_redirect_success() {
    let mut app = spawn_app();
    seed_link(
        &app.links,
        "redirect1",
        "https://example.com/target",
        true,
        None,
    )
    .await;

    let response = app.server.get("/redirect1").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/target");

    // the click was queued for reconciliation
    let event = app.click_rx.recv().await.unwrap();
    assert_eq!(event.short_code, "redirect1");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = spawn_app();

    let response = app.server.get("/missing1").await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_redirect_expired_is_not_found() {
    let app = spawn_app();
    seed_expired_link(&app.links, "expired1").await;

    let response = app.server.get("/expired1").await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_private_link_masked_for_anonymous() {
    let app = spawn_app();
    seed_link(
        &app.links,
        "private1",
        "https://example.com/secret",
        false,
        Some(Uuid::new_v4()),
    )
    .await;

    let denied = app.server.get("/private1").await;
    let missing = app.server.get("/missing1").await;

    // a denied link must be indistinguishable from a missing one
    assert_eq!(denied.status_code(), 404);
    assert_eq!(denied.text(), missing.text());
}

#[tokio::test]
async fn test_owner_can_follow_private_link() {
    let owner = Uuid::new_v4();
    let app = spawn_app();
    seed_link(
        &app.links,
        "private1",
        "https://example.com/secret",
        false,
        Some(owner),
    )
    .await;

    let response = app
        .server
        .get("/private1")
        .add_header(USER_ID_HEADER, owner.to_string())
        .await;

    assert_eq!(response.status_code(), 307);
}

#[tokio::test]
async fn test_second_redirect_served_from_cache() {
    let app = spawn_app();
    seed_link(&app.links, "cached01", "https://example.com/a", true, None).await;

    app.server.get("/cached01").await;
    // mutate the store behind the cache's back
    app.links.delete("cached01").await.unwrap();

    let response = app.server.get("/cached01").await;

    // still served from the static region
    assert_eq!(response.status_code(), 307);
}

#[tokio::test]
async fn test_malformed_user_header_rejected() {
    let app = spawn_app();
    seed_link(&app.links, "abc1234", "https://example.com", true, None).await;

    let response = app
        .server
        .get("/abc1234")
        .add_header(USER_ID_HEADER, "not-a-uuid")
        .await;

    assert_eq!(response.status_code(), 400);
}
