//! Book popularity ranking.
//!
//! The ranking is cumulative: a book's score is its all-time borrow count and
//! there is no decrement path.

use std::sync::Arc;

use lendstats_core::{BookId, HotBook};

use crate::error::Result;
use crate::keys;
use crate::AggregationStore;

/// Maintains and queries the `hot_books` ranking.
#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn AggregationStore>,
}

impl RankingEngine {
    /// Create a ranking engine over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn AggregationStore>) -> Self {
        Self { store }
    }

    /// Count one borrow of `book_id`; returns its new score.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn record_borrow(&self, book_id: &BookId) -> Result<u64> {
        let score = self
            .store
            .increment_score(keys::HOT_BOOKS, book_id.as_str(), 1.0)
            .await?;
        Ok(score_to_count(score))
    }

    /// The `limit` most borrowed books, highest score first.
    ///
    /// Ties keep the store's native order. A `limit` larger than the number
    /// of tracked books returns them all; `limit == 0` returns nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn top_n(&self, limit: usize) -> Result<Vec<HotBook>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let ranked = self.store.range_by_score(keys::HOT_BOOKS, limit).await?;
        Ok(ranked
            .into_iter()
            .map(|(book_id, score)| HotBook {
                book_id,
                borrow_count: score_to_count(score),
            })
            .collect())
    }

    /// Number of books with at least one borrow.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn tracked_book_count(&self) -> Result<u64> {
        self.store.ranked_cardinality(keys::HOT_BOOKS).await
    }

    /// Cumulative borrows of one book (0 if never borrowed).
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn score_of(&self, book_id: &BookId) -> Result<u64> {
        let score = self.store.score_of(keys::HOT_BOOKS, book_id.as_str()).await?;
        Ok(score.map_or(0, score_to_count))
    }
}

/// Scores are whole borrow counts stored as floats.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn score_to_count(score: f64) -> u64 {
    if score.is_finite() && score > 0.0 {
        score.round() as u64
    } else {
        0
    }
}
