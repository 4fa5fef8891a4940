//! DTOs for partial link updates.

use crate::domain::entities::LinkPatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use validator::Validate;

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Partial update request. Omitted fields are left unchanged;
/// `"expires_at": null` clears the expiry.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(url(message = "Invalid URL format"))]
    pub original_url: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,

    pub is_public: Option<bool>,
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(req: UpdateLinkRequest) -> Self {
        LinkPatch {
            original_url: req.original_url,
            expires_at: req.expires_at,
            is_public: req.is_public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_expiry_is_untouched() {
        let req: UpdateLinkRequest = serde_json::from_str(r#"{"is_public": false}"#).unwrap();
        let patch = LinkPatch::from(req);
        assert!(patch.expires_at.is_none());
        assert_eq!(patch.is_public, Some(false));
    }

    #[test]
    fn test_null_expiry_clears() {
        let req: UpdateLinkRequest = serde_json::from_str(r#"{"expires_at": null}"#).unwrap();
        let patch = LinkPatch::from(req);
        assert_eq!(patch.expires_at, Some(None));
    }

    #[test]
    fn test_set_expiry() {
        let req: UpdateLinkRequest =
            serde_json::from_str(r#"{"expires_at": "2030-01-01T00:00:00Z"}"#).unwrap();
        let patch = LinkPatch::from(req);
        assert!(matches!(patch.expires_at, Some(Some(_))));
    }
}
