//! Handler for link statistics.

use axum::Json;
use axum::extract::{Path, State};

use crate::api::dto::StatsResponse;
use crate::api::extract::Requester;
use crate::error::AppError;
use crate::state::AppState;

/// Returns statistics for a link: its static fields plus click counters.
///
/// # Endpoint
///
/// `GET /api/links/{code}/stats`
///
/// Counters include cached clicks not yet reconciled into the store. For
/// anonymous requesters a denied link is masked as 404; an authenticated
/// requester without access gets an explicit 403.
///
/// # Errors
///
/// - 404 Not Found - unknown or expired code (or denied + anonymous)
/// - 403 Forbidden - authenticated requester without read access
pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    requester: Requester,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state
        .resolution
        .stats(&code, requester.user_id())
        .await
        .map_err(|e| {
            if requester.user_id().is_none() {
                e.mask_not_found()
            } else {
                e
            }
        })?;

    Ok(Json(StatsResponse::from(stats)))
}
