//! Retention sweep and online keep-alive.

use std::sync::Arc;

use async_trait::async_trait;

use lendstats_core::{AnalyticsError, Clock, RetentionWindow, SweepReport};
use lendstats_store::{keys, AggregationStore, MembershipTracker};

use crate::scheduler::{Job, JobReport};

/// Deletes date-partitioned keys whose date falls inside the retention window.
#[derive(Clone)]
pub struct RetentionSweep {
    store: Arc<dyn AggregationStore>,
    clock: Arc<dyn Clock>,
    window: RetentionWindow,
}

impl RetentionSweep {
    /// Create a sweep over `window`, measured back from the clock's today.
    #[must_use]
    pub fn new(
        store: Arc<dyn AggregationStore>,
        clock: Arc<dyn Clock>,
        window: RetentionWindow,
    ) -> Self {
        Self {
            store,
            clock,
            window,
        }
    }

    /// The configured window.
    #[must_use]
    pub const fn window(&self) -> RetentionWindow {
        self.window
    }

    /// Sweep once.
    ///
    /// Keys that already expired are not counted. Re-running immediately
    /// removes nothing.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::StoreUnavailable` on the first failed delete;
    /// keys deleted before it stay deleted.
    pub async fn run_once(&self) -> Result<SweepReport, AnalyticsError> {
        let today = self.clock.today();
        let mut report = SweepReport::default();

        for date in self.window.dates(today) {
            for key in keys::date_partitioned(date) {
                report.keys_removed += self.store.delete(&key).await?;
            }
            report.dates_scanned += 1;
        }

        tracing::info!(
            dates_scanned = report.dates_scanned,
            keys_removed = report.keys_removed,
            min_age_days = self.window.min_age_days(),
            max_age_days = self.window.max_age_days(),
            "Retention sweep finished"
        );
        Ok(report)
    }
}

#[async_trait]
impl Job for RetentionSweep {
    fn name(&self) -> &'static str {
        "retention-sweep"
    }

    async fn run(&self) -> Result<JobReport, AnalyticsError> {
        let report = self.run_once().await?;
        Ok(JobReport::new(
            report.keys_removed,
            format!(
                "removed {} keys across {} dates",
                report.keys_removed, report.dates_scanned
            ),
        ))
    }
}

/// Re-applies the `online_users` expiry while the set is non-empty.
#[derive(Clone)]
pub struct OnlineKeepAlive {
    membership: MembershipTracker,
    ttl_seconds: u64,
}

impl OnlineKeepAlive {
    /// Create a keep-alive refreshing `online_users` to `ttl_seconds`.
    #[must_use]
    pub fn new(store: Arc<dyn AggregationStore>, ttl_seconds: u64) -> Self {
        Self {
            membership: MembershipTracker::new(store),
            ttl_seconds,
        }
    }

    /// Refresh once; returns how many members were kept.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::StoreUnavailable` if the store fails.
    pub async fn run_once(&self) -> Result<u64, AnalyticsError> {
        let kept = self
            .membership
            .keep_alive(keys::ONLINE_USERS, self.ttl_seconds)
            .await?;
        if kept == 0 {
            tracing::debug!("Online set empty, keep-alive skipped");
        } else {
            tracing::info!(online_users = kept, "Online set expiry refreshed");
        }
        Ok(kept)
    }
}

#[async_trait]
impl Job for OnlineKeepAlive {
    fn name(&self) -> &'static str {
        "online-keep-alive"
    }

    async fn run(&self) -> Result<JobReport, AnalyticsError> {
        let kept = self.run_once().await?;
        Ok(JobReport::new(kept, format!("kept {kept} online users")))
    }
}
