//! services/api/src/adapters/cache.rs
//!
//! Best-effort cache implementations of the `Cache` port. `RedisCache` talks
//! to a Redis instance through a shared connection manager; `NoopCache` is
//! selected at startup when no cache service is configured, so callers never
//! branch on whether caching is enabled.

use std::time::Duration;

use async_trait::async_trait;
use news_core::ports::Cache;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::warn;

//=========================================================================================
// Redis-backed Cache
//=========================================================================================

/// A cache adapter over a Redis connection manager. Every error is logged
/// and swallowed: a broken cache degrades to live fetches, never to request
/// failures.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) {
        let mut conn = self.connection.clone();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
        {
            warn!("cache write failed for {}: {}", key, e);
        }
    }
}

//=========================================================================================
// No-op Cache
//=========================================================================================

/// The null implementation: always misses, drops writes.
pub struct NoopCache;

#[async_trait]
impl Cache for NoopCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn put(&self, _key: &str, _value: &str, _ttl: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_cache_always_misses() {
        let cache = NoopCache;
        cache.put("k", "v", Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, None);
    }
}
