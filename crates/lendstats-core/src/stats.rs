//! Statistics returned by the query side.
//!
//! These types are the JSON bodies of the HTTP API and are shared with the
//! client SDK, so field names follow the wire format (camelCase).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Activity for the current date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    /// The date the counters belong to.
    pub date: NaiveDate,
    /// Borrows recorded today.
    pub borrows: u64,
    /// Returns recorded today.
    pub returns: u64,
    /// Members of the online set right now.
    pub online_users: u64,
    /// Distinct users that logged in today.
    pub daily_login_users: u64,
    /// `borrows - returns`; negative when more books came back than went out.
    pub net_borrows: i64,
}

impl TodayStats {
    /// Build today's stats, deriving `net_borrows`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn new(
        date: NaiveDate,
        borrows: u64,
        returns: u64,
        online_users: u64,
        daily_login_users: u64,
    ) -> Self {
        Self {
            date,
            borrows,
            returns,
            online_users,
            daily_login_users,
            net_borrows: borrows as i64 - returns as i64,
        }
    }
}

/// One entry of the popularity ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotBook {
    /// The book.
    pub book_id: String,
    /// Cumulative borrows of the book.
    pub borrow_count: u64,
}

/// The hot-book leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotBooks {
    /// Number of entries in `books`.
    pub total: usize,
    /// Entries, most borrowed first.
    pub books: Vec<HotBook>,
}

impl HotBooks {
    /// Wrap a ranked list.
    #[must_use]
    pub fn new(books: Vec<HotBook>) -> Self {
        Self {
            total: books.len(),
            books,
        }
    }
}

/// All-time figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    /// Borrows since the store was created.
    pub total_borrows: u64,
    /// Returns since the store was created.
    pub total_returns: u64,
    /// Members of the online set right now.
    pub current_online_users: u64,
    /// Books present in the ranking.
    pub tracked_books: u64,
    /// Seconds since the service started.
    pub system_uptime: f64,
    /// When this overview was computed.
    pub last_updated: DateTime<Utc>,
}

/// Activity for one past or present date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    /// The date.
    pub date: NaiveDate,
    /// Borrows recorded on the date.
    pub borrows: u64,
    /// Returns recorded on the date.
    pub returns: u64,
    /// Distinct users that logged in on the date.
    pub login_users: u64,
}

impl DayStats {
    /// A date with no recorded activity.
    #[must_use]
    pub const fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            borrows: 0,
            returns: 0,
            login_users: 0,
        }
    }
}

/// A run of consecutive days, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentDays {
    /// Human-readable description of the period.
    pub period: String,
    /// One entry per date.
    pub data: Vec<DayStats>,
}

impl RecentDays {
    /// Wrap per-day stats for a `days`-long period.
    #[must_use]
    pub fn new(days: u32, data: Vec<DayStats>) -> Self {
        Self {
            period: format!("last {days} days"),
            data,
        }
    }
}

/// Outcome of a retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Dates visited.
    pub dates_scanned: u32,
    /// Keys that existed and were deleted.
    pub keys_removed: u64,
}

/// Acknowledgement returned by write endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Always `true` on a 2xx response.
    pub success: bool,
    /// What was done.
    pub message: String,
    /// When it was done.
    pub timestamp: DateTime<Utc>,
}

impl Acknowledgement {
    /// A successful acknowledgement.
    #[must_use]
    pub fn ok(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            message: message.into(),
            timestamp,
        }
    }
}

/// Process memory figures, where the platform exposes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Resident set size in bytes.
    pub resident_bytes: Option<u64>,
    /// Virtual memory size in bytes.
    pub virtual_bytes: Option<u64>,
}

/// Service status report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Always `running` when the service answers.
    pub status: String,
    /// `connected` or `disconnected`.
    pub store_status: String,
    /// Seconds since the service started.
    pub uptime: f64,
    /// Process memory.
    pub memory: MemoryUsage,
    /// When the status was produced.
    pub timestamp: DateTime<Utc>,
}
