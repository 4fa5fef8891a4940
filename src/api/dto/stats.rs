//! DTOs for link statistics.

use crate::application::services::LinkStats;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub short_code: String,
    pub original_url: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

impl From<LinkStats> for StatsResponse {
    fn from(stats: LinkStats) -> Self {
        Self {
            short_code: stats.short_code,
            original_url: stats.original_url,
            is_public: stats.is_public,
            created_at: stats.created_at,
            expires_at: stats.expires_at,
            clicks_count: stats.clicks_count,
            last_clicked_at: stats.last_clicked_at,
        }
    }
}
