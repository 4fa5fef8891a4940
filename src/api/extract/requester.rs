//! Requester identity extractor.
//!
//! User identity arrives from the fronting gateway as an `X-User-Id` header
//! carrying a UUID. Absence means an anonymous request, which most read
//! paths accept; a present but malformed header is rejected outright.

use crate::error::AppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde_json::json;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user behind a request, if any.
#[derive(Debug, Clone, Copy)]
pub struct Requester(pub Option<Uuid>);

impl Requester {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0
    }

    /// Returns the user id or a `Forbidden` error for anonymous requests.
    pub fn require(&self) -> Result<Uuid, AppError> {
        self.0.ok_or_else(|| {
            AppError::forbidden("Authentication required", json!({}))
        })
    }
}

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Requester(None));
        };

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or_else(|| {
                AppError::bad_request("Invalid user id header", json!({ "header": USER_ID_HEADER }))
            })?;

        Ok(Requester(Some(user_id)))
    }
}
