//! Lending workflow events.
//!
//! Events are validated here and then folded into aggregates by the ingestor;
//! they are never persisted as discrete records.

use crate::error::{AnalyticsError, Result};
use crate::ids::{BookId, RawId, UserId};

/// The kinds of events the ingestor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A user borrowed a book.
    Borrow,
    /// A user returned a book.
    Return,
    /// A user logged in.
    Login,
}

impl EventKind {
    /// Get the kind name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Borrow => "borrow",
            Self::Return => "return",
            Self::Login => "login",
        }
    }
}

/// A borrow or return of one book by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingEvent {
    /// The book that changed hands.
    pub book_id: BookId,
    /// The user involved.
    pub user_id: UserId,
}

impl LendingEvent {
    /// Create an event from already-parsed identifiers.
    #[must_use]
    pub fn new(book_id: BookId, user_id: UserId) -> Self {
        Self { book_id, user_id }
    }

    /// Validate a wire payload.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::MissingParameter` if either identifier is
    /// absent or blank.
    pub fn from_raw(book_id: Option<RawId>, user_id: Option<RawId>) -> Result<Self> {
        let book_id = required::<BookId>(book_id, "bookId")?;
        let user_id = required::<UserId>(user_id, "userId")?;
        Ok(Self { book_id, user_id })
    }
}

/// A user login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginEvent {
    /// The user that logged in.
    pub user_id: UserId,
    /// Display name, used for logging only.
    pub username: Option<String>,
}

impl LoginEvent {
    /// Create a login event.
    #[must_use]
    pub fn new(user_id: UserId, username: Option<String>) -> Self {
        Self { user_id, username }
    }

    /// Validate a wire payload.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::MissingParameter` if the user id is absent or blank.
    pub fn from_raw(user_id: Option<RawId>, username: Option<String>) -> Result<Self> {
        let user_id = required::<UserId>(user_id, "userId")?;
        let username = username.filter(|name| !name.trim().is_empty());
        Ok(Self { user_id, username })
    }

    /// The username for log lines.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("unknown")
    }
}

fn required<T>(raw: Option<RawId>, field: &str) -> Result<T>
where
    T: TryFrom<String>,
{
    raw.map(RawId::into_text)
        .and_then(|text| T::try_from(text).ok())
        .ok_or_else(|| AnalyticsError::missing(field))
}
