//! Read-side statistics.
//!
//! Every figure is an independent point read. Reads inside one response run
//! concurrently and are not a snapshot: a write landing in between can make
//! two fields of the same response reflect slightly different instants.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use lendstats_core::{
    days_ending, AnalyticsError, Clock, DayStats, HotBooks, Overview, RecentDays, TodayStats,
};
use lendstats_store::{keys, AggregationStore, MembershipTracker, RankingEngine};

/// Computes derived statistics on demand.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn AggregationStore>,
    ranking: RankingEngine,
    membership: MembershipTracker,
    clock: Arc<dyn Clock>,
    started_at: DateTime<Utc>,
}

impl QueryService {
    /// Create a query service; uptime is measured from `started_at`.
    #[must_use]
    pub fn new(
        store: Arc<dyn AggregationStore>,
        clock: Arc<dyn Clock>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ranking: RankingEngine::new(store.clone()),
            membership: MembershipTracker::new(store.clone()),
            store,
            clock,
            started_at,
        }
    }

    /// Today's counters, online population and net borrows.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::StoreUnavailable` if any read fails.
    pub async fn today_stats(&self) -> Result<TodayStats, AnalyticsError> {
        let today = self.clock.today();
        let daily_logins = keys::daily_login_users(today);

        let (borrows, returns, online, logins) = futures::try_join!(
            self.counter(keys::daily_borrows(today)),
            self.counter(keys::daily_returns(today)),
            self.membership_count(keys::ONLINE_USERS),
            self.membership_count(&daily_logins),
        )?;

        Ok(TodayStats::new(today, borrows, returns, online, logins))
    }

    /// The `limit` most borrowed books; empty when nothing is tracked.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::StoreUnavailable` if the read fails.
    pub async fn hot_books(&self, limit: usize) -> Result<HotBooks, AnalyticsError> {
        let books = self.ranking.top_n(limit).await?;
        Ok(HotBooks::new(books))
    }

    /// All-time totals, current population and uptime.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::StoreUnavailable` if any read fails.
    pub async fn overview(&self) -> Result<Overview, AnalyticsError> {
        let (total_borrows, total_returns, online, tracked) = futures::try_join!(
            self.counter(keys::TOTAL_BORROWS.to_string()),
            self.counter(keys::TOTAL_RETURNS.to_string()),
            self.membership_count(keys::ONLINE_USERS),
            self.tracked_books(),
        )?;

        let now = self.clock.now();
        Ok(Overview {
            total_borrows,
            total_returns,
            current_online_users: online,
            tracked_books: tracked,
            system_uptime: self.uptime_seconds(now),
            last_updated: now,
        })
    }

    /// `days` consecutive dates ending today, oldest first.
    ///
    /// Dates without activity are reported with zeros, never skipped.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::StoreUnavailable` if any read fails.
    pub async fn recent_days(&self, days: u32) -> Result<RecentDays, AnalyticsError> {
        let dates = days_ending(self.clock.today(), days);
        let data =
            futures::future::try_join_all(dates.into_iter().map(|date| self.day_stats(date)))
                .await?;
        Ok(RecentDays::new(days, data))
    }

    /// Counters and login population for one date.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::StoreUnavailable` if any read fails.
    pub async fn day_stats(&self, date: NaiveDate) -> Result<DayStats, AnalyticsError> {
        let daily_logins = keys::daily_login_users(date);
        let (borrows, returns, login_users) = futures::try_join!(
            self.counter(keys::daily_borrows(date)),
            self.counter(keys::daily_returns(date)),
            self.membership_count(&daily_logins),
        )?;

        Ok(DayStats {
            date,
            borrows,
            returns,
            login_users,
        })
    }

    /// Seconds elapsed since `started_at`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn uptime_seconds(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = now - self.started_at;
        elapsed.num_milliseconds().max(0) as f64 / 1000.0
    }

    async fn counter(&self, key: String) -> Result<u64, AnalyticsError> {
        let value = self.store.get(&key).await?;
        Ok(value.map_or(0, |v| u64::try_from(v).unwrap_or(0)))
    }

    async fn membership_count(&self, set: &str) -> Result<u64, AnalyticsError> {
        Ok(self.membership.count(set).await?)
    }

    async fn tracked_books(&self) -> Result<u64, AnalyticsError> {
        Ok(self.ranking.tracked_book_count().await?)
    }
}
