//! Time-bounded membership sets.
//!
//! Expiry belongs to the whole set, not to individual members. Adding any
//! member pushes the deadline of every member, so one active user keeps the
//! rest of the set alive as well. Callers that need per-user presence must
//! not read these sets as such.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::Result;
use crate::AggregationStore;

/// Maintains membership sets with sliding or fixed whole-set expiry.
#[derive(Clone)]
pub struct MembershipTracker {
    store: Arc<dyn AggregationStore>,
}

impl MembershipTracker {
    /// Create a tracker over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn AggregationStore>) -> Self {
        Self { store }
    }

    /// Add `member` and reset the whole set's expiry to `ttl_seconds` from now.
    ///
    /// The expiry is reset even if `member` was already present. Returns
    /// whether the member was newly added.
    ///
    /// # Errors
    ///
    /// Returns an error if either store call fails. If the add succeeded and
    /// the expiry call failed, the member stays added.
    pub async fn add_and_refresh(&self, set: &str, member: &str, ttl_seconds: u64) -> Result<bool> {
        let inserted = self.store.add_member(set, member).await?;
        self.store.set_expiry(set, ttl_seconds).await?;
        Ok(inserted)
    }

    /// Add `member`, giving the set an expiry only if it has none yet.
    ///
    /// The first add of the set's lifetime fixes its deadline; later adds
    /// leave it untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if either store call fails.
    pub async fn add_with_fixed_expiry(
        &self,
        set: &str,
        member: &str,
        ttl_seconds: u64,
    ) -> Result<bool> {
        let inserted = self.store.add_member(set, member).await?;
        self.store.set_expiry_if_absent(set, ttl_seconds).await?;
        Ok(inserted)
    }

    /// Number of members currently in the set.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn count(&self, set: &str) -> Result<u64> {
        self.store.cardinality(set).await
    }

    /// Members currently in the set.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn members(&self, set: &str) -> Result<BTreeSet<String>> {
        Ok(self.store.members(set).await?.into_iter().collect())
    }

    /// Re-apply `ttl_seconds` to a non-empty set without adding anyone.
    ///
    /// An empty (or already expired) set is left alone so it is not brought
    /// back. Returns the number of members whose presence was extended.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn keep_alive(&self, set: &str, ttl_seconds: u64) -> Result<u64> {
        let count = self.store.cardinality(set).await?;
        if count == 0 {
            return Ok(0);
        }
        if self.store.set_expiry(set, ttl_seconds).await? {
            Ok(count)
        } else {
            // Expired between the two calls.
            Ok(0)
        }
    }

    /// Seconds until the set expires, if it exists and has an expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn expires_in(&self, set: &str) -> Result<Option<u64>> {
        self.store.ttl(set).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use lendstats_core::ManualClock;

    fn tracker() -> (MembershipTracker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ));
        let store = Arc::new(MemoryStore::new(clock.clone()));
        (MembershipTracker::new(store), clock)
    }

    #[tokio::test]
    async fn re_adding_member_keeps_count_but_resets_expiry() {
        let (tracker, clock) = tracker();
        assert!(tracker.add_and_refresh("online", "u1", 3600).await.unwrap());

        clock.advance(Duration::seconds(1000));
        assert_eq!(tracker.expires_in("online").await.unwrap(), Some(2600));

        assert!(!tracker.add_and_refresh("online", "u1", 3600).await.unwrap());
        assert_eq!(tracker.count("online").await.unwrap(), 1);
        assert_eq!(tracker.expires_in("online").await.unwrap(), Some(3600));
    }

    #[tokio::test]
    async fn any_add_extends_every_member() {
        let (tracker, clock) = tracker();
        tracker.add_and_refresh("online", "quiet", 3600).await.unwrap();

        clock.advance(Duration::seconds(3000));
        tracker.add_and_refresh("online", "busy", 3600).await.unwrap();

        clock.advance(Duration::seconds(3000));
        let members = tracker.members("online").await.unwrap();
        assert!(members.contains("quiet"));
        assert!(members.contains("busy"));

        clock.advance(Duration::seconds(600));
        assert_eq!(tracker.count("online").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fixed_expiry_is_not_reset() {
        let (tracker, clock) = tracker();
        tracker.add_with_fixed_expiry("daily", "u1", 100).await.unwrap();

        clock.advance(Duration::seconds(60));
        tracker.add_with_fixed_expiry("daily", "u2", 100).await.unwrap();
        assert_eq!(tracker.expires_in("daily").await.unwrap(), Some(40));

        clock.advance(Duration::seconds(40));
        assert_eq!(tracker.count("daily").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn keep_alive_extends_non_empty_set() {
        let (tracker, clock) = tracker();
        tracker.add_and_refresh("online", "u1", 3600).await.unwrap();
        tracker.add_and_refresh("online", "u2", 3600).await.unwrap();

        clock.advance(Duration::seconds(3000));
        assert_eq!(tracker.keep_alive("online", 3600).await.unwrap(), 2);
        assert_eq!(tracker.expires_in("online").await.unwrap(), Some(3600));
    }

    #[tokio::test]
    async fn keep_alive_does_not_resurrect_expired_set() {
        let (tracker, clock) = tracker();
        tracker.add_and_refresh("online", "u1", 60).await.unwrap();

        clock.advance(Duration::seconds(61));
        assert_eq!(tracker.keep_alive("online", 3600).await.unwrap(), 0);
        assert_eq!(tracker.count("online").await.unwrap(), 0);
        assert_eq!(tracker.expires_in("online").await.unwrap(), None);
    }
}
