//! Short-code resolution: the hot redirect path and the stats read model.
//!
//! Resolution reads the static cache region first and falls back to the
//! store, enforcing expiry and access on every path. Clicks are counted in
//! the cache immediately for display and handed to the reconciliation worker
//! for the durable increment.

use crate::application::cache_model::CachedLink;
use crate::application::services::access_policy::{AccessPolicy, Action, Decision, LinkAccess};
use crate::config::CacheTtls;
use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Link, UsageSnapshot};
use crate::domain::repositories::LinkStore;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, keys};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Stats read model: static link fields plus usage counters.
#[derive(Debug, Clone)]
pub struct LinkStats {
    pub short_code: String,
    pub original_url: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

/// Resolves short codes to their targets and records clicks.
pub struct ResolutionEngine {
    links: Arc<dyn LinkStore>,
    cache: Arc<dyn CacheService>,
    policy: Arc<AccessPolicy>,
    click_tx: mpsc::Sender<ClickEvent>,
    ttls: CacheTtls,
}

// Identical for missing, expired, and masked-deny outcomes; any variation
// in the body would let an anonymous caller probe for private links.
fn link_not_found() -> AppError {
    AppError::not_found("Short link not found", json!({}))
}

impl ResolutionEngine {
    pub fn new(
        links: Arc<dyn LinkStore>,
        cache: Arc<dyn CacheService>,
        policy: Arc<AccessPolicy>,
        click_tx: mpsc::Sender<ClickEvent>,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            links,
            cache,
            policy,
            click_tx,
            ttls,
        }
    }

    /// Resolves a short code for redirect and records the click.
    ///
    /// Expired links are `NotFound` even before the sweeper reclaims them.
    /// Denied access surfaces as `Forbidden`; the redirect handler masks it
    /// so a private link is indistinguishable from a missing one.
    pub async fn resolve(
        &self,
        code: &str,
        requester: Option<Uuid>,
    ) -> Result<CachedLink, AppError> {
        let now = Utc::now();
        let view = self.load_static(code, now).await?;

        let decision = self
            .policy
            .authorize(LinkAccess::from(&view), requester, Action::ReadRedirect)
            .await?;
        if decision == Decision::Deny {
            return Err(AppError::forbidden(
                "No access to this link",
                json!({ "short_code": code }),
            ));
        }

        self.record_click(code, now).await;
        Ok(view)
    }

    /// Returns static fields plus usage counters for a link.
    ///
    /// The static side always comes from the store; staleness is acceptable
    /// on redirects but not on an owner inspecting their own link. Counters
    /// prefer the cached hash, which runs ahead of the store between
    /// reconciliations.
    pub async fn stats(&self, code: &str, requester: Option<Uuid>) -> Result<LinkStats, AppError> {
        let now = Utc::now();
        let link = self
            .links
            .find_by_code(code)
            .await?
            .ok_or_else(link_not_found)?;
        if link.is_expired_at(now) {
            return Err(link_not_found());
        }

        let decision = self
            .policy
            .authorize(LinkAccess::from(&link), requester, Action::ReadStats)
            .await?;
        if decision == Decision::Deny {
            return Err(AppError::forbidden(
                "No access to this link's statistics",
                json!({ "short_code": code }),
            ));
        }

        let usage = self.usage_snapshot(&link).await;
        Ok(LinkStats {
            short_code: link.short_code,
            original_url: link.original_url,
            is_public: link.is_public,
            created_at: link.created_at,
            expires_at: link.expires_at,
            clicks_count: usage.clicks_count,
            last_clicked_at: usage.last_clicked_at,
        })
    }

    /// Loads the static view of a link, cache first.
    async fn load_static(&self, code: &str, now: DateTime<Utc>) -> Result<CachedLink, AppError> {
        let key = keys::static_key(code);

        if let Ok(Some(raw)) = self.cache.get(&key).await {
            match serde_json::from_str::<CachedLink>(&raw) {
                Ok(view) => {
                    if view.is_expired_at(now) {
                        // logically gone; drop both regions ahead of the sweeper
                        let _ = self.cache.delete(&key).await;
                        let _ = self.cache.delete(&keys::stats_key(code)).await;
                        return Err(link_not_found());
                    }
                    return Ok(view);
                }
                Err(e) => {
                    tracing::warn!(code, error = %e, "Dropping undecodable static cache entry");
                    let _ = self.cache.delete(&key).await;
                }
            }
        }

        let link = self
            .links
            .find_by_code(code)
            .await?
            .ok_or_else(link_not_found)?;
        if link.is_expired_at(now) {
            return Err(link_not_found());
        }

        let view = CachedLink::from(&link);
        if let Ok(encoded) = serde_json::to_string(&view) {
            let _ = self.cache.set(&key, &encoded, self.ttls.static_link).await;
        }
        self.seed_stats_if_missing(&link).await;
        Ok(view)
    }

    /// Seeds the counter hash from the store row so the stats path has
    /// something to read before the next click. Only when the hash is absent:
    /// overwriting would discard increments not yet reconciled.
    async fn seed_stats_if_missing(&self, link: &Link) {
        let key = keys::stats_key(&link.short_code);
        if let Ok(None) = self.cache.hash_get_all(&key).await {
            let _ = self
                .cache
                .hash_set(
                    &key,
                    keys::STATS_CLICKS_FIELD,
                    &link.clicks_count.to_string(),
                    self.ttls.stats,
                )
                .await;
            if let Some(at) = link.last_clicked_at {
                let _ = self
                    .cache
                    .hash_set(
                        &key,
                        keys::STATS_LAST_CLICKED_FIELD,
                        &at.to_rfc3339(),
                        self.ttls.stats,
                    )
                    .await;
            }
        }
    }

    /// Counts one resolution: bump the cached counter for display, then hand
    /// the event to the reconciliation worker. When the queue is full or the
    /// worker is gone, the store is incremented synchronously instead, so
    /// each resolution reaches the store exactly once.
    async fn record_click(&self, code: &str, now: DateTime<Utc>) {
        let stats_key = keys::stats_key(code);
        match self
            .cache
            .hash_increment(&stats_key, keys::STATS_CLICKS_FIELD, 1, self.ttls.stats)
            .await
        {
            Ok(_) => {
                let _ = self
                    .cache
                    .hash_set(
                        &stats_key,
                        keys::STATS_LAST_CLICKED_FIELD,
                        &now.to_rfc3339(),
                        self.ttls.stats,
                    )
                    .await;
            }
            Err(e) => {
                tracing::debug!(code, error = %e, "Cached click counter unavailable");
            }
        }

        if self.click_tx.try_send(ClickEvent::new(code, now)).is_err() {
            match self.links.increment_clicks(code, 1, now).await {
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        code,
                        error = %e,
                        "Click lost: queue unavailable and store increment failed"
                    );
                }
            }
        }
    }

    async fn usage_snapshot(&self, link: &Link) -> UsageSnapshot {
        let key = keys::stats_key(&link.short_code);
        if let Ok(Some(fields)) = self.cache.hash_get_all(&key).await
            && let Some(cached_clicks) = fields
                .get(keys::STATS_CLICKS_FIELD)
                .and_then(|v| v.parse::<i64>().ok())
        {
            let last_clicked_at = fields
                .get(keys::STATS_LAST_CLICKED_FIELD)
                .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
                .map(|t| t.with_timezone(&Utc));
            // the hash may have been re-seeded from a row older than the
            // last reconciliation; the store count is the floor
            return UsageSnapshot {
                clicks_count: cached_clicks.max(link.clicks_count),
                last_clicked_at: last_clicked_at.max(link.last_clicked_at),
            };
        }

        self.seed_stats_if_missing(link).await;
        UsageSnapshot::from_link(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewLink;
    use crate::infrastructure::cache::MemoryCache;
    use crate::infrastructure::persistence::{MemoryLinkStore, MemoryProjectStore};
    use chrono::Duration;

    struct Fixture {
        links: Arc<MemoryLinkStore>,
        cache: Arc<MemoryCache>,
        engine: ResolutionEngine,
        click_rx: mpsc::Receiver<ClickEvent>,
    }

    fn fixture() -> Fixture {
        fixture_with_queue_capacity(16)
    }

    fn fixture_with_queue_capacity(capacity: usize) -> Fixture {
        let links = Arc::new(MemoryLinkStore::new());
        let cache = Arc::new(MemoryCache::new());
        let policy = Arc::new(AccessPolicy::new(
            Arc::new(MemoryProjectStore::new()),
            cache.clone(),
            std::time::Duration::from_secs(300),
        ));
        let (click_tx, click_rx) = mpsc::channel(capacity);
        let engine = ResolutionEngine::new(
            links.clone(),
            cache.clone(),
            policy,
            click_tx,
            CacheTtls::default(),
        );
        Fixture {
            links,
            cache,
            engine,
            click_rx,
        }
    }

    async fn seed_link(links: &MemoryLinkStore, code: &str, is_public: bool) -> Link {
        links
            .create(NewLink {
                short_code: code.to_string(),
                original_url: "https://example.com/page".to_string(),
                project_id: 1,
                owner_id: None,
                is_public,
                expires_at: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_returns_target_and_enqueues_click() {
        let mut fx = fixture();
        seed_link(&fx.links, "abc1234", true).await;

        let view = fx.engine.resolve("abc1234", None).await.unwrap();

        assert_eq!(view.original_url, "https://example.com/page");
        let event = fx.click_rx.recv().await.unwrap();
        assert_eq!(event.short_code, "abc1234");
    }

    #[tokio::test]
    async fn test_resolve_populates_static_region() {
        let fx = fixture();
        seed_link(&fx.links, "abc1234", true).await;

        fx.engine.resolve("abc1234", None).await.unwrap();

        let cached = fx.cache.get(&keys::static_key("abc1234")).await.unwrap();
        assert!(cached.is_some());
    }

    #[tokio::test]
    async fn test_resolve_unknown_code_is_not_found() {
        let fx = fixture();
        let err = fx.engine.resolve("missing", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_private_link_denied_for_anonymous() {
        let fx = fixture();
        seed_link(&fx.links, "abc1234", false).await;

        let err = fx.engine.resolve("abc1234", None).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_expired_link_is_not_found_even_when_cached() {
        let fx = fixture();
        let link = seed_link(&fx.links, "abc1234", true).await;

        // cache an already-expired static entry directly
        let mut view = CachedLink::from(&link);
        view.expires_at = Some(Utc::now() - Duration::seconds(1));
        fx.cache
            .set(
                &keys::static_key("abc1234"),
                &serde_json::to_string(&view).unwrap(),
                std::time::Duration::from_secs(60),
            )
            .await
            .unwrap();

        let err = fx.engine.resolve("abc1234", None).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        // the stale entry was dropped
        let cached = fx.cache.get(&keys::static_key("abc1234")).await.unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_full_queue_falls_back_to_synchronous_increment() {
        let fx = fixture_with_queue_capacity(1);
        seed_link(&fx.links, "abc1234", true).await;

        // first resolve fills the queue, second must hit the store directly
        fx.engine.resolve("abc1234", None).await.unwrap();
        fx.engine.resolve("abc1234", None).await.unwrap();

        let link = fx.links.find_by_code("abc1234").await.unwrap().unwrap();
        assert_eq!(link.clicks_count, 1);
    }

    #[tokio::test]
    async fn test_stats_prefer_cached_counter() {
        let fx = fixture();
        seed_link(&fx.links, "abc1234", true).await;

        // three resolutions, none reconciled into the store yet
        for _ in 0..3 {
            fx.engine.resolve("abc1234", None).await.unwrap();
        }

        let stats = fx.engine.stats("abc1234", None).await.unwrap();
        assert_eq!(stats.clicks_count, 3);
        assert!(stats.last_clicked_at.is_some());
    }

    #[tokio::test]
    async fn test_stats_fall_back_to_store_on_cache_miss() {
        let fx = fixture();
        seed_link(&fx.links, "abc1234", true).await;
        fx.links
            .increment_clicks("abc1234", 7, Utc::now())
            .await
            .unwrap();

        let stats = fx.engine.stats("abc1234", None).await.unwrap();

        assert_eq!(stats.clicks_count, 7);
    }

    #[tokio::test]
    async fn test_undecodable_cache_entry_falls_back_to_store() {
        let fx = fixture();
        seed_link(&fx.links, "abc1234", true).await;
        fx.cache
            .set(
                &keys::static_key("abc1234"),
                "not json",
                std::time::Duration::from_secs(60),
            )
            .await
            .unwrap();

        let view = fx.engine.resolve("abc1234", None).await.unwrap();

        assert_eq!(view.original_url, "https://example.com/page");
    }
}
