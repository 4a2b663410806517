//! Expiry and retention policy.

use chrono::{Duration, NaiveDate};

use crate::error::{AnalyticsError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Sliding expiry of the `online_users` set, in seconds (1 hour).
pub const ONLINE_USERS_TTL_SECS: u64 = 3600;

/// Sliding expiry of the `active_users` set, in seconds (1 hour).
pub const ACTIVE_USERS_TTL_SECS: u64 = 3600;

/// Fixed expiry of a daily login set, in seconds (7 days).
pub const DAILY_LOGIN_TTL_SECS: u64 = 86_400 * 7;

/// Default youngest age (in days) eligible for the retention sweep.
pub const DEFAULT_RETENTION_MIN_AGE_DAYS: u32 = 8;

/// Default oldest age (in days) visited by the retention sweep.
pub const DEFAULT_RETENTION_MAX_AGE_DAYS: u32 = 60;

/// Age range, in days before today, whose date-partitioned keys are purged.
///
/// Both bounds are inclusive. A date older than `max_age_days` is never
/// visited again and relies on natural expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    min_age_days: u32,
    max_age_days: u32,
}

impl RetentionWindow {
    /// Create a window.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` unless `1 <= min <= max`.
    /// Age 0 is today, which must never be swept.
    pub fn new(min_age_days: u32, max_age_days: u32) -> Result<Self> {
        if min_age_days == 0 {
            return Err(AnalyticsError::Configuration(
                "retention window must not include today".into(),
            ));
        }
        if min_age_days > max_age_days {
            return Err(AnalyticsError::Configuration(format!(
                "retention window is empty: min {min_age_days} > max {max_age_days}"
            )));
        }
        Ok(Self {
            min_age_days,
            max_age_days,
        })
    }

    /// Youngest age swept.
    #[must_use]
    pub const fn min_age_days(&self) -> u32 {
        self.min_age_days
    }

    /// Oldest age swept.
    #[must_use]
    pub const fn max_age_days(&self) -> u32 {
        self.max_age_days
    }

    /// Dates covered by the window relative to `today`, newest first.
    #[must_use]
    pub fn dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        (self.min_age_days..=self.max_age_days)
            .filter_map(|age| today.checked_sub_signed(Duration::days(i64::from(age))))
            .collect()
    }
}

impl Default for RetentionWindow {
    fn default() -> Self {
        Self {
            min_age_days: DEFAULT_RETENTION_MIN_AGE_DAYS,
            max_age_days: DEFAULT_RETENTION_MAX_AGE_DAYS,
        }
    }
}
