//! Serializable cache projections of link records.

use crate::domain::entities::Link;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Static-region view of a link: everything resolution and authorization
/// need. Usage counters are deliberately excluded so this entry never serves
/// a stale click count; those live in the separately-keyed counter hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedLink {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub project_id: i64,
    pub owner_id: Option<Uuid>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedLink {
    /// Mirrors [`Link::is_expired_at`]: a cached entry past its expiry must
    /// be treated as absent even before its cache TTL runs out.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e <= now)
    }
}

impl From<&Link> for CachedLink {
    fn from(link: &Link) -> Self {
        Self {
            id: link.id,
            short_code: link.short_code.clone(),
            original_url: link.original_url.clone(),
            project_id: link.project_id,
            owner_id: link.owner_id,
            is_public: link.is_public,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

/// Popular-rollup entry: the public fields of a ranked link plus the click
/// count the ranking was computed from. Rollups are TTL-bounded snapshots;
/// counts here may lag the live counter hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularEntry {
    pub short_code: String,
    pub original_url: String,
    pub clicks_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Link> for PopularEntry {
    fn from(link: &Link) -> Self {
        Self {
            short_code: link.short_code.clone(),
            original_url: link.original_url.clone(),
            clicks_count: link.clicks_count,
            last_clicked_at: link.last_clicked_at,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_link() -> Link {
        Link {
            id: 7,
            short_code: "abc1234".to_string(),
            original_url: "https://example.com/".to_string(),
            project_id: 1,
            owner_id: Some(Uuid::new_v4()),
            is_public: false,
            created_at: Utc::now(),
            expires_at: Some(Utc::now() + Duration::days(1)),
            clicks_count: 99,
            last_clicked_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_cached_link_round_trips_through_json() {
        let view = CachedLink::from(&sample_link());
        let json = serde_json::to_string(&view).unwrap();
        let back: CachedLink = serde_json::from_str(&json).unwrap();
        assert_eq!(back.short_code, view.short_code);
        assert_eq!(back.owner_id, view.owner_id);
        assert_eq!(back.expires_at, view.expires_at);
    }

    #[test]
    fn test_cached_link_expiry_matches_entity() {
        let link = sample_link();
        let view = CachedLink::from(&link);
        let later = Utc::now() + Duration::days(2);
        assert_eq!(link.is_expired_at(later), view.is_expired_at(later));
    }

    #[test]
    fn test_popular_entry_keeps_count() {
        let entry = PopularEntry::from(&sample_link());
        assert_eq!(entry.clicks_count, 99);
    }
}
