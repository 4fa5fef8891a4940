//! DTOs for link creation.

use crate::application::services::CreateLink;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Request to create a short link.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,

    /// Optional custom short code. Full alias rules are enforced by the
    /// link service; this catches the obvious length mistakes early.
    #[validate(length(min = 4, max = 32))]
    pub custom_alias: Option<String>,

    /// Target project. Defaults to the public project.
    pub project_id: Option<i64>,

    /// Optional expiry. Defaults to the project's link lifetime.
    pub expires_at: Option<DateTime<Utc>>,

    /// Link visibility. Ignored for anonymous requests, which are always
    /// public.
    pub is_public: Option<bool>,
}

impl From<ShortenRequest> for CreateLink {
    fn from(req: ShortenRequest) -> Self {
        CreateLink {
            original_url: req.original_url,
            custom_alias: req.custom_alias,
            project_id: req.project_id,
            expires_at: req.expires_at,
            is_public: req.is_public,
        }
    }
}
