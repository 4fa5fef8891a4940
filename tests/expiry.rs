//! Expiry semantics across the read path and the sweeper.

mod common;

use common::{seed_expired_link, seed_link, spawn_app};
use linkhub::application::services::Sweeper;
use linkhub::domain::repositories::LinkStore;
use linkhub::infrastructure::cache::{CacheService, keys};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_expired_but_unswept_link_is_gone_everywhere() {
    let app = spawn_app();
    seed_expired_link(&app.links, "expired1").await;

    // still present in the store, but logically gone
    assert!(app.links.find_by_code("expired1").await.unwrap().is_some());
    assert_eq!(app.server.get("/expired1").await.status_code(), 404);
    assert_eq!(
        app.server.get("/api/links/expired1/stats").await.status_code(),
        404
    );
}

#[tokio::test]
async fn test_sweeper_reclaims_and_invalidates() {
    let app = spawn_app();
    seed_expired_link(&app.links, "expired1").await;
    seed_link(&app.links, "alive001", "https://example.com", true, None).await;
    app.cache
        .set(
            &keys::static_key("expired1"),
            "{}",
            Duration::from_secs(3600),
        )
        .await
        .unwrap();

    let sweeper = Sweeper::new(
        app.links.clone() as Arc<dyn LinkStore>,
        app.cache.clone(),
        Duration::from_secs(300),
    );
    let outcome = sweeper.sweep_once().await;

    assert_eq!(outcome.reclaimed, 1);
    assert!(app.links.find_by_code("expired1").await.unwrap().is_none());
    assert!(app.links.find_by_code("alive001").await.unwrap().is_some());
    assert!(
        app.cache
            .get(&keys::static_key("expired1"))
            .await
            .unwrap()
            .is_none()
    );

    // a second sweep finds nothing and changes nothing
    let again = sweeper.sweep_once().await;
    assert_eq!(again.reclaimed, 0);
    assert_eq!(again.failed, 0);
}

#[tokio::test]
async fn test_reused_code_after_sweep_resolves_fresh() {
    let app = spawn_app();
    seed_expired_link(&app.links, "reuse001").await;
    // resolution caches nothing for the expired link
    assert_eq!(app.server.get("/reuse001").await.status_code(), 404);

    let sweeper = Sweeper::new(
        app.links.clone() as Arc<dyn LinkStore>,
        app.cache.clone(),
        Duration::from_secs(300),
    );
    sweeper.sweep_once().await;

    seed_link(&app.links, "reuse001", "https://example.com/new", true, None).await;

    let response = app.server.get("/reuse001").await;
    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/new");
}
