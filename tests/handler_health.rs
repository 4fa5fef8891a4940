mod common;

use common::spawn_app;

#[tokio::test]
async fn test_health_reports_cache_state() {
    let app = spawn_app();

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cache"], "healthy");
}

#[tokio::test]
async fn test_trailing_content_does_not_match_api_routes() {
    let app = spawn_app();

    // `/health` is a static route; `/healthx` falls through to the redirect
    // matcher and misses
    let response = app.server.get("/healthx").await;

    assert_eq!(response.status_code(), 404);
}
