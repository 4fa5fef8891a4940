//! Cache service trait and error types.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
    /// Backend cannot perform the operation (e.g. caching is disabled).
    #[error("Cache operation unsupported: {0}")]
    Unsupported(&'static str),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value cache with hash-field counters, used for every cache region
/// (static link metadata, usage counters, permission decisions, popular
/// rollups; see [`super::keys`]).
///
/// The cache is a pure performance layer: every value stored here must be
/// reconstructible from the link store, and callers must degrade to store
/// reads when an operation fails. Plain reads are fail-open (`Ok(None)` on
/// backend errors); counter increments surface errors so callers can fall
/// back to a synchronous store write instead of silently losing a click.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - production backend
/// - [`crate::infrastructure::cache::MemoryCache`] - in-process variant
/// - [`crate::infrastructure::cache::NullCache`] - caching disabled
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Reads a plain value. `Ok(None)` means miss; backend errors are logged
    /// by implementations and also read as a miss.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Writes a plain value with a TTL. Implementations log and swallow
    /// backend errors; a failed write is just a future miss.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes one key.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Removes every key starting with `prefix`. Used for project-scoped
    /// permission sweeps and popular-rollup invalidation, where enumerating
    /// the exact keys is unbounded.
    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<()>;

    /// Atomically adds `delta` to a hash field, creating the hash if needed
    /// and refreshing its TTL. Returns the new value.
    ///
    /// Unlike plain writes this propagates backend errors: the caller must
    /// know the increment did not land.
    async fn hash_increment(
        &self,
        key: &str,
        field: &str,
        delta: i64,
        ttl: Duration,
    ) -> CacheResult<i64>;

    /// Sets a hash field, refreshing the hash TTL. Fail-open like [`set`].
    ///
    /// [`set`]: CacheService::set
    async fn hash_set(&self, key: &str, field: &str, value: &str, ttl: Duration)
    -> CacheResult<()>;

    /// Reads all fields of a hash. `Ok(None)` means the hash does not exist,
    /// which is distinct from an existing hash with no matching fields.
    async fn hash_get_all(&self, key: &str) -> CacheResult<Option<HashMap<String, String>>>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
