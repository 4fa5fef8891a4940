//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A shortened URL link with metadata.
///
/// `owner_id` is `None` for links created anonymously through the public
/// project. `clicks_count` and `last_clicked_at` are the authoritative usage
/// counters; the cache keeps an independently updated copy of them.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub project_id: i64,
    pub owner_id: Option<Uuid>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Returns true if the link has passed its expiry time.
    ///
    /// An expired link is logically gone the moment the clock passes
    /// `expires_at`, even if the sweeper has not reclaimed it yet.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub original_url: String,
    pub project_id: i64,
    pub owner_id: Option<Uuid>,
    pub is_public: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
/// `expires_at: Some(None)` clears the expiry; `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub original_url: Option<String>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_public: Option<bool>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.original_url.is_none() && self.expires_at.is_none() && self.is_public.is_none()
    }
}

/// Click count plus last-click time for a link.
///
/// Cached separately from the link's static fields because it mutates on
/// every redirect while the rest of the record is nearly immutable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub clicks_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

impl UsageSnapshot {
    pub fn from_link(link: &Link) -> Self {
        Self {
            clicks_count: link.clicks_count,
            last_clicked_at: link.last_clicked_at,
        }
    }
}
