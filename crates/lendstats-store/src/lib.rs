//! Aggregation store layer for lendstats.
//!
//! This crate wraps the atomic primitives of a shared key-value store
//! (counters, sorted sets, plain sets, key expiry, deletion) behind the
//! [`AggregationStore`] trait, and builds the two thin structures the rest of
//! the service needs on top of it:
//!
//! - [`RankingEngine`]: the `hot_books` popularity ranking
//! - [`MembershipTracker`]: sets whose whole-set expiry slides on every add
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local, expiry driven by an injected clock
//! - `RedisStore` (feature `redis-backend`): a shared Redis server
//!
//! # Atomicity
//!
//! Each primitive is atomic on its own. Nothing here spans keys: two calls
//! are two independent round-trips, and a failure between them leaves the
//! first one applied.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lendstats_core::SystemClock;
//! use lendstats_store::{keys, AggregationStore, MemoryStore};
//!
//! # async fn example() -> lendstats_store::Result<()> {
//! let store = MemoryStore::new(Arc::new(SystemClock));
//! store.increment(keys::TOTAL_BORROWS).await?;
//! assert_eq!(store.get(keys::TOTAL_BORROWS).await?, Some(1));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod membership;
pub mod memory;
pub mod ranking;
#[cfg(feature = "redis-backend")]
pub mod redis_store;

pub use error::{Result, StoreError};
pub use membership::MembershipTracker;
pub use memory::MemoryStore;
pub use ranking::RankingEngine;
#[cfg(feature = "redis-backend")]
pub use redis_store::RedisStore;

use async_trait::async_trait;

/// The storage trait defining every primitive the aggregation engine uses.
///
/// Keys are plain strings (see [`keys`]). Reads of absent keys return the
/// empty value for their structure (`None`, `0`, empty vector), never an
/// error.
#[async_trait]
pub trait AggregationStore: Send + Sync {
    // =========================================================================
    // Writes
    // =========================================================================

    /// Increment an integer counter by one, creating it at zero first.
    ///
    /// Returns the value after the increment.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the key is not a counter.
    async fn increment(&self, key: &str) -> Result<i64>;

    /// Add `delta` to a member's score in a ranking, creating either as needed.
    ///
    /// Returns the member's new score.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the key is not a ranking.
    async fn increment_score(&self, key: &str, member: &str, delta: f64) -> Result<f64>;

    /// Add a member to a set.
    ///
    /// Returns `true` if the member was not already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the key is not a set.
    async fn add_member(&self, key: &str, member: &str) -> Result<bool>;

    /// Expire the whole key `seconds` from now, replacing any current expiry.
    ///
    /// Returns `false` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn set_expiry(&self, key: &str, seconds: u64) -> Result<bool>;

    /// Expire the key `seconds` from now only if it has no expiry yet.
    ///
    /// Returns `true` if an expiry was applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn set_expiry_if_absent(&self, key: &str, seconds: u64) -> Result<bool>;

    /// Delete a key.
    ///
    /// Returns the number of keys removed (0 if it was already gone).
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn delete(&self, key: &str) -> Result<u64>;

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read a counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the key is not a counter.
    async fn get(&self, key: &str) -> Result<Option<i64>>;

    /// Read one member's score.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the key is not a ranking.
    async fn score_of(&self, key: &str, member: &str) -> Result<Option<f64>>;

    /// Number of members of a set.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the key is not a set.
    async fn cardinality(&self, key: &str) -> Result<u64>;

    /// Number of members of a ranking.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the key is not a ranking.
    async fn ranked_cardinality(&self, key: &str) -> Result<u64>;

    /// Up to `limit` members of a ranking, highest score first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the key is not a ranking.
    async fn range_by_score(&self, key: &str, limit: usize) -> Result<Vec<(String, f64)>>;

    /// All members of a set, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the key is not a set.
    async fn members(&self, key: &str) -> Result<Vec<String>>;

    /// Seconds until the key expires; `None` if absent or without expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn ttl(&self, key: &str) -> Result<Option<u64>>;

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if it is not.
    async fn ping(&self) -> Result<()>;
}
