//! In-process cache implementation.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Entry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Default)]
struct Regions {
    plain: HashMap<String, Entry<String>>,
    hashes: HashMap<String, Entry<HashMap<String, String>>>,
}

/// Mutex-backed cache for single-process deployments and the test suite.
///
/// Counter increments are atomic under the lock, matching the semantics the
/// resolution engine relies on from Redis. The lock is never held across an
/// await point.
#[derive(Default)]
pub struct MemoryCache {
    regions: Mutex<Regions>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Regions> {
        // Poisoning only happens if another holder panicked; the maps are
        // still structurally valid, so keep serving.
        self.regions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut regions = self.lock();
        match regions.plain.get(key) {
            Some(entry) if entry.is_live() => Ok(Some(entry.value.clone())),
            Some(_) => {
                regions.plain.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.lock()
            .plain
            .insert(key.to_string(), Entry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut regions = self.lock();
        regions.plain.remove(key);
        regions.hashes.remove(key);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<()> {
        let mut regions = self.lock();
        regions.plain.retain(|k, _| !k.starts_with(prefix));
        regions.hashes.retain(|k, _| !k.starts_with(prefix));
        Ok(())
    }

    async fn hash_increment(
        &self,
        key: &str,
        field: &str,
        delta: i64,
        ttl: Duration,
    ) -> CacheResult<i64> {
        let mut regions = self.lock();

        let entry = regions.hashes.entry(key.to_string()).or_insert_with(|| {
            Entry::new(HashMap::new(), ttl)
        });
        if !entry.is_live() {
            entry.value.clear();
        }
        entry.expires_at = Instant::now() + ttl;

        let current: i64 = entry
            .value
            .get(field)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let next = current + delta;
        entry.value.insert(field.to_string(), next.to_string());

        Ok(next)
    }

    async fn hash_set(
        &self,
        key: &str,
        field: &str,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<()> {
        let mut regions = self.lock();

        let entry = regions
            .hashes
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(HashMap::new(), ttl));
        if !entry.is_live() {
            entry.value.clear();
        }
        entry.expires_at = Instant::now() + ttl;
        entry.value.insert(field.to_string(), value.to_string());

        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> CacheResult<Option<HashMap<String, String>>> {
        let mut regions = self.lock();
        match regions.hashes.get(key) {
            Some(entry) if entry.is_live() => Ok(Some(entry.value.clone())),
            Some(_) => {
                regions.hashes.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }
}
