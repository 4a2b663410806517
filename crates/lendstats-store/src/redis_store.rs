//! Redis storage implementation.
//!
//! Each trait primitive is one Redis command, so every call keeps the
//! atomicity Redis gives a single command and nothing more. The exception is
//! `set_expiry_if_absent`, a `TTL` read followed by `EXPIRE`.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};

use crate::error::{Result, StoreError};
use crate::AggregationStore;

/// Redis-backed aggregation store.
///
/// Cloning is cheap: clones share one multiplexed connection that
/// reconnects on its own after a failure.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the Redis server at `url` (e.g. `redis://localhost:6379`).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the URL is invalid or the server
    /// cannot be reached.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(unavailable)?;
        let conn = ConnectionManager::new(client).await.map_err(unavailable)?;

        tracing::info!("Connected to Redis aggregation store");
        Ok(Self { conn })
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

fn unavailable(err: RedisError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl AggregationStore for RedisStore {
    async fn increment(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn();
        let value: i64 = redis::cmd("INCR")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(value)
    }

    async fn increment_score(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
        let mut conn = self.conn();
        let score: f64 = redis::cmd("ZINCRBY")
            .arg(key)
            .arg(delta)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(score)
    }

    async fn add_member(&self, key: &str, member: &str) -> Result<bool> {
        let mut conn = self.conn();
        let added: i64 = redis::cmd("SADD")
            .arg(key)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(added > 0)
    }

    async fn set_expiry(&self, key: &str, seconds: u64) -> Result<bool> {
        let mut conn = self.conn();
        let applied: i64 = redis::cmd("EXPIRE")
            .arg(key)
            .arg(seconds)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(applied == 1)
    }

    async fn set_expiry_if_absent(&self, key: &str, seconds: u64) -> Result<bool> {
        // TTL then EXPIRE rather than `EXPIRE NX`, which needs Redis 7.
        // Concurrent first writers may both apply; their deadlines differ by
        // the gap between the two calls.
        let mut conn = self.conn();
        let remaining: i64 = redis::cmd("TTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;

        // -2: no such key. -1: key without expiry.
        if remaining != -1 {
            return Ok(false);
        }

        let applied: i64 = redis::cmd("EXPIRE")
            .arg(key)
            .arg(seconds)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(applied == 1)
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn();
        let removed: u64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(removed)
    }

    async fn get(&self, key: &str) -> Result<Option<i64>> {
        let mut conn = self.conn();
        let value: Option<i64> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(value)
    }

    async fn score_of(&self, key: &str, member: &str) -> Result<Option<f64>> {
        let mut conn = self.conn();
        let score: Option<f64> = redis::cmd("ZSCORE")
            .arg(key)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(score)
    }

    async fn cardinality(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn();
        let count: u64 = redis::cmd("SCARD")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(count)
    }

    async fn ranked_cardinality(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn();
        let count: u64 = redis::cmd("ZCARD")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(count)
    }

    async fn range_by_score(&self, key: &str, limit: usize) -> Result<Vec<(String, f64)>> {
        // A stop index of -1 would mean "to the end", so zero is answered here.
        if limit == 0 {
            return Ok(Vec::new());
        }
        let stop = i64::try_from(limit - 1).unwrap_or(-1);

        let mut conn = self.conn();
        let ranked: Vec<(String, f64)> = redis::cmd("ZREVRANGE")
            .arg(key)
            .arg(0)
            .arg(stop)
            .arg("WITHSCORES")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(ranked)
    }

    async fn members(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.conn();
        let members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(members)
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>> {
        let mut conn = self.conn();
        // -2: no such key, -1: no expiry.
        let seconds: i64 = redis::cmd("TTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(u64::try_from(seconds).ok())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! These tests need a disposable Redis server.
    //!
    //! Run with: `REDIS_URL=redis://localhost:6379 cargo test -p lendstats-store -- --ignored`

    use super::*;

    async fn connect() -> RedisStore {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        RedisStore::connect(&url).await.unwrap()
    }

    fn unique_key(name: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("lendstats-test:{name}:{nanos}")
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis server
    async fn live_counter_and_expiry() {
        let store = connect().await;
        let key = unique_key("counter");

        assert_eq!(store.get(&key).await.unwrap(), None);
        assert_eq!(store.increment(&key).await.unwrap(), 1);
        assert!(store.set_expiry(&key, 60).await.unwrap());
        assert!(!store.set_expiry_if_absent(&key, 10).await.unwrap());
        assert!(store.ttl(&key).await.unwrap().unwrap() > 10);
        assert_eq!(store.delete(&key).await.unwrap(), 1);
        assert_eq!(store.delete(&key).await.unwrap(), 0);
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis server
    async fn live_fixed_expiry_applies_once() {
        let store = connect().await;
        let key = unique_key("daily");

        assert!(!store.set_expiry_if_absent(&key, 60).await.unwrap());
        store.add_member(&key, "u1").await.unwrap();
        assert!(store.set_expiry_if_absent(&key, 60).await.unwrap());
        assert!(!store.set_expiry_if_absent(&key, 600).await.unwrap());
        assert!(store.ttl(&key).await.unwrap().unwrap() <= 60);

        store.delete(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis server
    async fn live_ranking() {
        let store = connect().await;
        let key = unique_key("ranking");

        store.increment_score(&key, "a", 1.0).await.unwrap();
        store.increment_score(&key, "b", 3.0).await.unwrap();
        let ranked = store.range_by_score(&key, 5).await.unwrap();
        assert_eq!(ranked[0], ("b".to_string(), 3.0));
        assert!(store.range_by_score(&key, 0).await.unwrap().is_empty());

        store.delete(&key).await.unwrap();
    }
}
