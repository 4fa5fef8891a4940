//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Redis cache backing every region.
///
/// Uses `ConnectionManager` for connection reuse. Plain reads and writes are
/// fail-open (logged, treated as a miss); hash increments propagate errors so
/// the resolution engine can fall back to a synchronous store write.
pub struct RedisCache {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: "linkhub:".to_string(),
        })
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(value)) => {
                debug!("Cache HIT: {}", key);
                Ok(Some(value))
            }
            Ok(None) => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn
            .set_ex::<_, _, ()>(&key, value, ttl.as_secs().max(1))
            .await
        {
            Ok(_) => {
                debug!("Cache SET: {} (TTL: {:?})", key, ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache INVALIDATE: {}", key);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<()> {
        let pattern = format!("{}*", self.build_key(prefix));
        let mut scan_conn = self.client.clone();

        let keys: Vec<String> = {
            let mut iter = match scan_conn.scan_match::<_, String>(&pattern).await {
                Ok(iter) => iter,
                Err(e) => {
                    warn!("Redis SCAN error for {}: {}", pattern, e);
                    return Ok(());
                }
            };

            let mut keys = Vec::new();
            while let Some(item) = iter.next_item().await {
                match item {
                    Ok(key) => keys.push(key),
                    Err(e) => {
                        warn!("Redis SCAN error for {}: {}", pattern, e);
                        return Ok(());
                    }
                }
            }
            keys
        };

        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.client.clone();
        match conn.del::<_, i64>(&keys).await {
            Ok(deleted) => {
                debug!("Cache INVALIDATE prefix {}: {} keys", pattern, deleted);
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for prefix {}: {}", pattern, e);
                Ok(())
            }
        }
    }

    async fn hash_increment(
        &self,
        key: &str,
        field: &str,
        delta: i64,
        ttl: Duration,
    ) -> CacheResult<i64> {
        let key = self.build_key(key);
        let mut conn = self.client.clone();

        let value: i64 = conn
            .hincr(&key, field, delta)
            .await
            .map_err(|e| CacheError::Operation(format!("HINCRBY {} failed: {}", key, e)))?;

        // TTL refresh is best-effort; a lapsed TTL only means an earlier miss.
        if let Err(e) = conn.expire::<_, ()>(&key, ttl.as_secs() as i64).await {
            warn!("Redis EXPIRE error for {}: {}", key, e);
        }

        Ok(value)
    }

    async fn hash_set(
        &self,
        key: &str,
        field: &str,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.hset::<_, _, _, ()>(&key, field, value).await {
            Ok(_) => {
                if let Err(e) = conn.expire::<_, ()>(&key, ttl.as_secs() as i64).await {
                    warn!("Redis EXPIRE error for {}: {}", key, e);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis HSET error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn hash_get_all(&self, key: &str) -> CacheResult<Option<HashMap<String, String>>> {
        let key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.hgetall::<_, HashMap<String, String>>(&key).await {
            // HGETALL returns an empty map for a missing key; the regions
            // never store empty hashes, so empty means miss.
            Ok(map) if map.is_empty() => Ok(None),
            Ok(map) => Ok(Some(map)),
            Err(e) => {
                error!("Redis HGETALL error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
