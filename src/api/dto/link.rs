//! Link representation returned by the API.

use crate::application::cache_model::PopularEntry;
use crate::domain::entities::Link;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub project_id: i64,
    pub owner_id: Option<Uuid>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl LinkResponse {
    pub fn from_link(link: &Link, short_url: String) -> Self {
        Self {
            short_code: link.short_code.clone(),
            short_url,
            original_url: link.original_url.clone(),
            project_id: link.project_id,
            owner_id: link.owner_id,
            is_public: link.is_public,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub links: Vec<LinkResponse>,
}

/// Entry in the popular-links listing.
#[derive(Debug, Serialize)]
pub struct PopularLinkResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub clicks_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

impl PopularLinkResponse {
    pub fn from_entry(entry: &PopularEntry, short_url: String) -> Self {
        Self {
            short_code: entry.short_code.clone(),
            short_url,
            original_url: entry.original_url.clone(),
            clicks_count: entry.clicks_count,
            last_clicked_at: entry.last_clicked_at,
        }
    }
}
