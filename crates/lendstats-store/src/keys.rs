//! Key naming conventions.
//!
//! All aggregates live under fixed, conventionally named keys. Daily
//! aggregates carry a `YYYY-MM-DD` suffix (see [`lendstats_core::date_key`]).

use chrono::NaiveDate;
use lendstats_core::date_key;

/// All-time borrow counter.
pub const TOTAL_BORROWS: &str = "stats:total_borrows";

/// All-time return counter.
pub const TOTAL_RETURNS: &str = "stats:total_returns";

/// Ranking of books by cumulative borrows.
pub const HOT_BOOKS: &str = "hot_books";

/// Users that borrowed within the last sliding hour.
pub const ACTIVE_USERS: &str = "active_users";

/// Users that logged in within the last sliding hour.
pub const ONLINE_USERS: &str = "online_users";

const DAILY_BORROWS_PREFIX: &str = "stats:today_borrows";
const DAILY_RETURNS_PREFIX: &str = "stats:today_returns";
const DAILY_LOGIN_USERS_PREFIX: &str = "stats:daily_login_users";

/// Borrow counter for one date.
#[must_use]
pub fn daily_borrows(date: NaiveDate) -> String {
    format!("{DAILY_BORROWS_PREFIX}:{}", date_key(date))
}

/// Return counter for one date.
#[must_use]
pub fn daily_returns(date: NaiveDate) -> String {
    format!("{DAILY_RETURNS_PREFIX}:{}", date_key(date))
}

/// Login set for one date.
#[must_use]
pub fn daily_login_users(date: NaiveDate) -> String {
    format!("{DAILY_LOGIN_USERS_PREFIX}:{}", date_key(date))
}

/// Every date-partitioned key belonging to `date`.
#[must_use]
pub fn date_partitioned(date: NaiveDate) -> [String; 3] {
    [
        daily_borrows(date),
        daily_returns(date),
        daily_login_users(date),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_keys_carry_date_suffix() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(daily_borrows(date), "stats:today_borrows:2024-02-09");
        assert_eq!(daily_returns(date), "stats:today_returns:2024-02-09");
        assert_eq!(daily_login_users(date), "stats:daily_login_users:2024-02-09");
    }

    #[test]
    fn date_partitioned_lists_all_daily_keys() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        let keys = date_partitioned(date);
        assert_eq!(keys.len(), 3);
        assert!(keys.iter().all(|k| k.ends_with(":2024-02-09")));
    }
}
