//! Handler for link creation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::api::dto::{LinkResponse, ShortenRequest};
use crate::api::extract::Requester;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// Anonymous requests are accepted: the link lands in the public project,
/// is forced public, and its lifetime is clamped to the project's ceiling.
/// Authenticated requests may target any project the requester can create
/// in.
///
/// # Errors
///
/// - 400 Bad Request - invalid URL, alias, or expiry
/// - 403 Forbidden - requester cannot create in the target project
/// - 404 Not Found - target project does not exist
/// - 409 Conflict - custom alias already taken
/// - 503 Service Unavailable - code generation exhausted its retry budget
pub async fn shorten_handler(
    State(state): State<AppState>,
    requester: Requester,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(payload.into(), requester.user_id())
        .await?;

    let short_url = state.short_url(&link.short_code);
    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(&link, short_url)),
    ))
}
