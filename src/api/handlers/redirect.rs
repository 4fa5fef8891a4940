//! Handler for short URL redirect.

use axum::extract::{Path, State};
use axum::response::Redirect;

use crate::api::extract::Requester;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// The resolution engine serves the target from the static cache region when
/// possible and records the click. Denied access is masked: a private link
/// the requester cannot see answers 404 exactly like a missing code, so this
/// endpoint never confirms that a code exists.
///
/// # Errors
///
/// Returns 404 Not Found for unknown, expired, or inaccessible codes.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    requester: Requester,
) -> Result<Redirect, AppError> {
    let view = state
        .resolution
        .resolve(&code, requester.user_id())
        .await
        .map_err(AppError::mask_not_found)?;

    Ok(Redirect::temporary(&view.original_url))
}
