//! Core types and utilities for lendstats.
//!
//! This crate provides the foundational types shared by the store, the
//! service and the client SDK:
//!
//! - **Identifiers**: `BookId`, `UserId`, `RawId`
//! - **Events**: `LendingEvent`, `LoginEvent`, `EventKind`
//! - **Time**: `Clock`, `SystemClock`, `ManualClock`, date-partition helpers
//! - **Retention**: `RetentionWindow` and the expiry constants
//! - **Statistics**: `TodayStats`, `HotBooks`, `Overview`, `RecentDays`, ...
//!
//! # Date partitions
//!
//! Daily counters and login sets are keyed by the UTC calendar date at the
//! moment an event is ingested, rendered as `YYYY-MM-DD`. A client-supplied
//! event timestamp never moves an event into another partition.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod clock;
pub mod error;
pub mod event;
pub mod ids;
pub mod retention;
pub mod stats;

pub use clock::{date_key, days_ending, Clock, ManualClock, SystemClock, DATE_KEY_FORMAT};
pub use error::{AnalyticsError, Result};
pub use event::{EventKind, LendingEvent, LoginEvent};
pub use ids::{BookId, IdError, RawId, UserId};
pub use retention::{
    RetentionWindow, ACTIVE_USERS_TTL_SECS, DAILY_LOGIN_TTL_SECS,
    DEFAULT_RETENTION_MAX_AGE_DAYS, DEFAULT_RETENTION_MIN_AGE_DAYS, ONLINE_USERS_TTL_SECS,
};
pub use stats::{
    Acknowledgement, DayStats, HotBook, HotBooks, MemoryUsage, Overview, RecentDays,
    ServiceStatus, SweepReport, TodayStats,
};
