//! In-memory storage implementation.
//!
//! This module provides the `MemoryStore` implementation of the
//! `AggregationStore` trait. It mirrors the Redis semantics the service relies
//! on: expiry applies to a whole key, writes to an existing key keep its
//! expiry, and an expired key behaves exactly like an absent one.
//!
//! Expiry is lazy: a key is dropped the first time it is touched at or after
//! its deadline, measured by the injected [`Clock`].

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use lendstats_core::Clock;

use crate::error::{Result, StoreError};
use crate::AggregationStore;

/// A value held under one key.
#[derive(Debug, Clone)]
enum Value {
    Counter(i64),
    Set(BTreeSet<String>),
    Ranking(HashMap<String, f64>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

type Data = HashMap<String, Entry>;

/// Process-local aggregation store.
pub struct MemoryStore {
    data: Mutex<Data>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store whose expiry follows `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of live keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn key_count(&self) -> Result<usize> {
        self.with_data(|data, now| Ok(data.values().filter(|e| !e.is_expired(now)).count()))
    }

    /// Run `f` under the lock with the current instant.
    fn with_data<R>(&self, f: impl FnOnce(&mut Data, DateTime<Utc>) -> Result<R>) -> Result<R> {
        let now = self.clock.now();
        let mut data = self
            .data
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("memory store lock poisoned: {e}")))?;
        f(&mut data, now)
    }

    /// Look up a live entry, dropping it first if it has expired.
    fn live<'a>(data: &'a mut Data, key: &str, now: DateTime<Utc>) -> Option<&'a mut Entry> {
        if data.get(key).is_some_and(|entry| entry.is_expired(now)) {
            data.remove(key);
        }
        data.get_mut(key)
    }

    /// Look up a live entry, creating it from `init` if absent.
    fn live_or_insert<'a>(
        data: &'a mut Data,
        key: &str,
        now: DateTime<Utc>,
        init: impl FnOnce() -> Value,
    ) -> &'a mut Entry {
        if data.get(key).is_some_and(|entry| entry.is_expired(now)) {
            data.remove(key);
        }
        data.entry(key.to_string())
            .or_insert_with(|| Entry::new(init()))
    }

    fn deadline(now: DateTime<Utc>, seconds: u64) -> DateTime<Utc> {
        let seconds = i64::try_from(seconds).unwrap_or(i64::MAX);
        now.checked_add_signed(Duration::try_seconds(seconds).unwrap_or(Duration::MAX))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn wrong_type(key: &str, expected: &'static str) -> StoreError {
        StoreError::WrongType {
            key: key.to_string(),
            expected,
        }
    }
}

#[async_trait]
impl AggregationStore for MemoryStore {
    async fn increment(&self, key: &str) -> Result<i64> {
        self.with_data(|data, now| {
            let entry = Self::live_or_insert(data, key, now, || Value::Counter(0));
            match &mut entry.value {
                Value::Counter(count) => {
                    *count += 1;
                    Ok(*count)
                }
                _ => Err(Self::wrong_type(key, "counter")),
            }
        })
    }

    async fn increment_score(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
        self.with_data(|data, now| {
            let entry = Self::live_or_insert(data, key, now, || Value::Ranking(HashMap::new()));
            match &mut entry.value {
                Value::Ranking(scores) => {
                    let score = scores.entry(member.to_string()).or_insert(0.0);
                    *score += delta;
                    Ok(*score)
                }
                _ => Err(Self::wrong_type(key, "ranking")),
            }
        })
    }

    async fn add_member(&self, key: &str, member: &str) -> Result<bool> {
        self.with_data(|data, now| {
            let entry = Self::live_or_insert(data, key, now, || Value::Set(BTreeSet::new()));
            match &mut entry.value {
                Value::Set(members) => Ok(members.insert(member.to_string())),
                _ => Err(Self::wrong_type(key, "set")),
            }
        })
    }

    async fn set_expiry(&self, key: &str, seconds: u64) -> Result<bool> {
        self.with_data(|data, now| match Self::live(data, key, now) {
            Some(entry) => {
                entry.expires_at = Some(Self::deadline(now, seconds));
                Ok(true)
            }
            None => Ok(false),
        })
    }

    async fn set_expiry_if_absent(&self, key: &str, seconds: u64) -> Result<bool> {
        self.with_data(|data, now| match Self::live(data, key, now) {
            Some(entry) if entry.expires_at.is_none() => {
                entry.expires_at = Some(Self::deadline(now, seconds));
                Ok(true)
            }
            _ => Ok(false),
        })
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        self.with_data(|data, now| {
            let existed = Self::live(data, key, now).is_some();
            if existed {
                data.remove(key);
            }
            Ok(u64::from(existed))
        })
    }

    async fn get(&self, key: &str) -> Result<Option<i64>> {
        self.with_data(|data, now| match Self::live(data, key, now) {
            None => Ok(None),
            Some(Entry {
                value: Value::Counter(count),
                ..
            }) => Ok(Some(*count)),
            Some(_) => Err(Self::wrong_type(key, "counter")),
        })
    }

    async fn score_of(&self, key: &str, member: &str) -> Result<Option<f64>> {
        self.with_data(|data, now| match Self::live(data, key, now) {
            None => Ok(None),
            Some(Entry {
                value: Value::Ranking(scores),
                ..
            }) => Ok(scores.get(member).copied()),
            Some(_) => Err(Self::wrong_type(key, "ranking")),
        })
    }

    async fn cardinality(&self, key: &str) -> Result<u64> {
        self.with_data(|data, now| match Self::live(data, key, now) {
            None => Ok(0),
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => Ok(members.len() as u64),
            Some(_) => Err(Self::wrong_type(key, "set")),
        })
    }

    async fn ranked_cardinality(&self, key: &str) -> Result<u64> {
        self.with_data(|data, now| match Self::live(data, key, now) {
            None => Ok(0),
            Some(Entry {
                value: Value::Ranking(scores),
                ..
            }) => Ok(scores.len() as u64),
            Some(_) => Err(Self::wrong_type(key, "ranking")),
        })
    }

    async fn range_by_score(&self, key: &str, limit: usize) -> Result<Vec<(String, f64)>> {
        self.with_data(|data, now| match Self::live(data, key, now) {
            None => Ok(Vec::new()),
            Some(Entry {
                value: Value::Ranking(scores),
                ..
            }) => {
                let mut ranked: Vec<(String, f64)> =
                    scores.iter().map(|(m, s)| (m.clone(), *s)).collect();
                // Same order as ZREVRANGE: score descending, then member descending.
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
                ranked.truncate(limit);
                Ok(ranked)
            }
            Some(_) => Err(Self::wrong_type(key, "ranking")),
        })
    }

    async fn members(&self, key: &str) -> Result<Vec<String>> {
        self.with_data(|data, now| match Self::live(data, key, now) {
            None => Ok(Vec::new()),
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(Self::wrong_type(key, "set")),
        })
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>> {
        self.with_data(|data, now| {
            Ok(Self::live(data, key, now)
                .and_then(|entry| entry.expires_at)
                .and_then(|deadline| u64::try_from((deadline - now).num_seconds()).ok()))
        })
    }

    async fn ping(&self) -> Result<()> {
        self.with_data(|_, _| Ok(()))
    }
}
