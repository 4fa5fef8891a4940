//! No-op cache implementation for disabled caching.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// A cache implementation that stores nothing.
///
/// Used when Redis is unavailable or caching is explicitly disabled. Every
/// read is a miss, so callers always fall through to the store; counter
/// increments report [`CacheError::Unsupported`], which routes clicks through
/// the synchronous store path.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn delete_by_prefix(&self, _prefix: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn hash_increment(
        &self,
        _key: &str,
        _field: &str,
        _delta: i64,
        _ttl: Duration,
    ) -> CacheResult<i64> {
        Err(CacheError::Unsupported("caching disabled"))
    }

    async fn hash_set(
        &self,
        _key: &str,
        _field: &str,
        _value: &str,
        _ttl: Duration,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn hash_get_all(&self, _key: &str) -> CacheResult<Option<HashMap<String, String>>> {
        Ok(None)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
