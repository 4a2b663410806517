//! Event ingestion.
//!
//! Each event kind maps to a fixed sequence of store writes. The writes are
//! independent round-trips: if one fails, the ones before it stay applied and
//! the error is returned to the caller, who decides whether to resend.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use lendstats_core::{
    AnalyticsError, Clock, EventKind, LendingEvent, LoginEvent, ACTIVE_USERS_TTL_SECS,
    DAILY_LOGIN_TTL_SECS, ONLINE_USERS_TTL_SECS,
};
use lendstats_store::{keys, AggregationStore, MembershipTracker, RankingEngine};

/// Result of a successfully ingested event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recorded {
    /// What was recorded.
    pub kind: EventKind,
    /// The date partition the event was counted in.
    pub date: NaiveDate,
    /// When the event was ingested.
    pub timestamp: DateTime<Utc>,
}

/// Folds events into aggregate state.
#[derive(Clone)]
pub struct EventIngestor {
    store: Arc<dyn AggregationStore>,
    ranking: RankingEngine,
    membership: MembershipTracker,
    clock: Arc<dyn Clock>,
}

impl EventIngestor {
    /// Create an ingestor writing to `store`, partitioning by `clock`.
    #[must_use]
    pub fn new(store: Arc<dyn AggregationStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ranking: RankingEngine::new(store.clone()),
            membership: MembershipTracker::new(store.clone()),
            store,
            clock,
        }
    }

    /// Record a borrow.
    ///
    /// Increments the all-time and daily borrow counters, adds one to the
    /// book's ranking score and refreshes the borrower in `active_users`.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::StoreUnavailable` if any write fails.
    pub async fn record_borrow(&self, event: &LendingEvent) -> Result<Recorded, AnalyticsError> {
        let now = self.clock.now();
        let date = now.date_naive();

        self.store.increment(keys::TOTAL_BORROWS).await?;
        self.store.increment(&keys::daily_borrows(date)).await?;
        self.ranking.record_borrow(&event.book_id).await?;
        self.membership
            .add_and_refresh(keys::ACTIVE_USERS, event.user_id.as_str(), ACTIVE_USERS_TTL_SECS)
            .await?;

        tracing::info!(
            book_id = %event.book_id,
            user_id = %event.user_id,
            date = %date,
            "Borrow recorded"
        );

        Ok(Recorded {
            kind: EventKind::Borrow,
            date,
            timestamp: now,
        })
    }

    /// Record a return.
    ///
    /// Increments the all-time and daily return counters only; the ranking
    /// and membership sets are untouched.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::StoreUnavailable` if any write fails.
    pub async fn record_return(&self, event: &LendingEvent) -> Result<Recorded, AnalyticsError> {
        let now = self.clock.now();
        let date = now.date_naive();

        self.store.increment(keys::TOTAL_RETURNS).await?;
        self.store.increment(&keys::daily_returns(date)).await?;

        tracing::info!(
            book_id = %event.book_id,
            user_id = %event.user_id,
            date = %date,
            "Return recorded"
        );

        Ok(Recorded {
            kind: EventKind::Return,
            date,
            timestamp: now,
        })
    }

    /// Record a login.
    ///
    /// Refreshes the user in `online_users` (sliding expiry) and adds them to
    /// today's login set, whose expiry is fixed by the first login of the day.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::StoreUnavailable` if any write fails.
    pub async fn record_login(&self, event: &LoginEvent) -> Result<Recorded, AnalyticsError> {
        let now = self.clock.now();
        let date = now.date_naive();
        let user = event.user_id.as_str();

        self.membership
            .add_and_refresh(keys::ONLINE_USERS, user, ONLINE_USERS_TTL_SECS)
            .await?;
        self.membership
            .add_with_fixed_expiry(&keys::daily_login_users(date), user, DAILY_LOGIN_TTL_SECS)
            .await?;

        tracing::info!(
            user_id = %event.user_id,
            username = %event.display_name(),
            date = %date,
            "Login recorded"
        );

        Ok(Recorded {
            kind: EventKind::Login,
            date,
            timestamp: now,
        })
    }
}
