//! Statistics handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use lendstats_core::{HotBooks, Overview, RecentDays, TodayStats};

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Query Parameter Limits
// ============================================================================

/// Books returned by `hot-books` when `limit` is absent or unusable.
pub const DEFAULT_HOT_BOOKS_LIMIT: usize = 10;

/// Upper bound on `limit`.
pub const MAX_HOT_BOOKS_LIMIT: usize = 1000;

/// Days returned by `recent-days` when `days` is absent or unusable.
pub const DEFAULT_RECENT_DAYS: u32 = 7;

/// Upper bound on `days`.
pub const MAX_RECENT_DAYS: u32 = 365;

/// Query for `GET /api/stats/hot-books`.
///
/// Kept as raw text so malformed values fall back to the default instead of
/// failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct HotBooksQuery {
    /// Maximum number of books.
    pub limit: Option<String>,
}

/// Query for `GET /api/stats/recent-days`.
#[derive(Debug, Default, Deserialize)]
pub struct RecentDaysQuery {
    /// Number of days ending today.
    pub days: Option<String>,
}

/// Parse a positive integer, falling back to `default` and capping at `max`.
fn lenient_positive<T>(raw: Option<&str>, default: T, max: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default + Copy,
{
    match raw.and_then(|s| s.trim().parse::<T>().ok()) {
        Some(v) if v > T::default() => {
            if v > max {
                max
            } else {
                v
            }
        }
        _ => default,
    }
}

/// Today's counters.
pub async fn today(State(state): State<Arc<AppState>>) -> Result<Json<TodayStats>, ApiError> {
    Ok(Json(state.queries.today_stats().await?))
}

/// Most borrowed books.
pub async fn hot_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HotBooksQuery>,
) -> Result<Json<HotBooks>, ApiError> {
    let limit = lenient_positive(
        query.limit.as_deref(),
        DEFAULT_HOT_BOOKS_LIMIT,
        MAX_HOT_BOOKS_LIMIT,
    );
    Ok(Json(state.queries.hot_books(limit).await?))
}

/// All-time overview.
pub async fn overview(State(state): State<Arc<AppState>>) -> Result<Json<Overview>, ApiError> {
    Ok(Json(state.queries.overview().await?))
}

/// Per-day rollup for the last N days.
pub async fn recent_days(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentDaysQuery>,
) -> Result<Json<RecentDays>, ApiError> {
    let days = lenient_positive(query.days.as_deref(), DEFAULT_RECENT_DAYS, MAX_RECENT_DAYS);
    Ok(Json(state.queries.recent_days(days).await?))
}
