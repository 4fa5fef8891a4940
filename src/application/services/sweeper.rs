//! Background reclamation of expired links.
//!
//! Expiry is enforced at read time; the sweeper only reclaims storage and
//! cache space afterwards. Cycles are idempotent: a link deleted by a
//! previous cycle (or a concurrent instance) counts as already gone.

use crate::domain::entities::Link;
use crate::domain::repositories::LinkStore;
use crate::infrastructure::cache::{CacheService, keys};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Result of one sweep cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Links deleted this cycle.
    pub reclaimed: usize,
    /// Links that could not be deleted and were skipped.
    pub failed: usize,
}

/// Periodically deletes expired links and drops their cache state.
pub struct Sweeper {
    links: Arc<dyn LinkStore>,
    cache: Arc<dyn CacheService>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(links: Arc<dyn LinkStore>, cache: Arc<dyn CacheService>, interval: Duration) -> Self {
        Self {
            links,
            cache,
            interval,
        }
    }

    /// Runs sweep cycles until `shutdown` flips.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.sweep_once().await;
                    if outcome.reclaimed > 0 || outcome.failed > 0 {
                        tracing::info!(
                            reclaimed = outcome.reclaimed,
                            failed = outcome.failed,
                            "Expiry sweep finished"
                        );
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("Expiry sweeper shutting down");
                    break;
                }
            }
        }
    }

    /// One sweep cycle: delete every link expired as of now and invalidate
    /// its cache regions. A failed delete skips that link; the next cycle
    /// retries it.
    pub async fn sweep_once(&self) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();

        let expired = match self.links.list_expired(Utc::now()).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(error = %e, "Expiry sweep could not list expired links");
                return outcome;
            }
        };

        for link in expired {
            match self.links.delete(&link.short_code).await {
                Ok(deleted) => {
                    self.invalidate(&link).await;
                    if deleted {
                        outcome.reclaimed += 1;
                        tracing::debug!(code = %link.short_code, "Reclaimed expired link");
                    }
                }
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        code = %link.short_code,
                        error = %e,
                        "Expiry sweep failed to delete link"
                    );
                }
            }
        }

        if outcome.reclaimed > 0 {
            let _ = self.cache.delete_by_prefix(keys::POPULAR_PREFIX).await;
        }

        outcome
    }

    async fn invalidate(&self, link: &Link) {
        let _ = self.cache.delete(&keys::static_key(&link.short_code)).await;
        let _ = self.cache.delete(&keys::stats_key(&link.short_code)).await;
        let _ = self
            .cache
            .delete_by_prefix(&keys::acl_link_prefix(link.project_id, link.id))
            .await;
    }
}
