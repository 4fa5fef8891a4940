//! Handler for the health endpoint.

use axum::Json;
use axum::extract::State;

use crate::api::dto::HealthResponse;
use crate::state::AppState;

/// Liveness and cache-tier health.
///
/// # Endpoint
///
/// `GET /health`
///
/// A degraded cache does not fail the check: the service keeps working
/// against the store alone.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = if !state.cache_enabled {
        "disabled"
    } else if state.cache.health_check().await {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: "ok",
        cache,
    })
}
