use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::CatalogReader,
    error::{AppError, AppResult, StoreResultExt},
    models::RatingStats,
};

/// Count, arithmetic mean and extremes of a set of 1-5 scores.
///
/// An empty set yields all zeros rather than NaN.
pub fn aggregate(scores: &[u8]) -> RatingStats {
    if scores.is_empty() {
        return RatingStats::default();
    }

    let sum: u64 = scores.iter().map(|&s| u64::from(s)).sum();
    RatingStats {
        mean: sum as f64 / scores.len() as f64,
        count: scores.len(),
        max: scores.iter().copied().max().unwrap_or(0),
        min: scores.iter().copied().min().unwrap_or(0),
    }
}

/// Per-book rating summaries
#[derive(Clone)]
pub struct RatingAggregator {
    store: Arc<dyn CatalogReader>,
}

impl RatingAggregator {
    pub fn new(store: Arc<dyn CatalogReader>) -> Self {
        Self { store }
    }

    /// Rating summary of one book; fails with `NotFound` for an unknown id
    pub async fn book_stats(&self, book_id: Uuid) -> AppResult<RatingStats> {
        self.store
            .get_book(book_id)
            .await
            .during("book_stats")?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))?;

        let reviews = self
            .store
            .list_reviews_for_book(book_id)
            .await
            .during("book_stats")?;
        let scores: Vec<u8> = reviews.iter().map(|r| r.score).collect();

        Ok(aggregate(&scores))
    }
}
