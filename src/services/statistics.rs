use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::{
    db::CatalogReader,
    error::{AppResult, StoreResultExt},
    models::{BookSummary, BookView, GenreCount, RankedBook, Statistics, YearCount},
    services::projection::CatalogIndex,
};

const YEAR_BUCKETS: usize = 10;
const RECENT_BOOKS: usize = 5;
const TOP_RATED_BOOKS: usize = 5;

/// Rounds to one decimal place for display
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Orders rated books by average score, then review count, then title
pub fn rank_order(a: &BookView, b: &BookView) -> std::cmp::Ordering {
    b.average_score
        .total_cmp(&a.average_score)
        .then(b.review_count.cmp(&a.review_count))
        .then_with(|| a.book.title.cmp(&b.book.title))
}

/// Catalog-wide statistics, recomputed from the store on every call
#[derive(Clone)]
pub struct StatisticsEngine {
    store: Arc<dyn CatalogReader>,
}

impl StatisticsEngine {
    pub fn new(store: Arc<dyn CatalogReader>) -> Self {
        Self { store }
    }

    pub async fn overview(&self) -> AppResult<Statistics> {
        let books = self.store.list_books().await.during("overview")?;
        let index = CatalogIndex::load(self.store.as_ref())
            .await
            .during("overview")?;

        let (score_sum, score_count) = index
            .all_scores()
            .fold((0u64, 0u64), |(sum, n), s| (sum + u64::from(s), n + 1));
        let average_rating = if score_count == 0 {
            0.0
        } else {
            round_one_decimal(score_sum as f64 / score_count as f64)
        };

        let views: Vec<BookView> = books.into_iter().map(|b| index.project(b)).collect();

        let genre_distribution = genre_distribution(&views);
        let year_distribution = year_distribution(&views);

        let mut recent: Vec<&BookView> = views.iter().collect();
        recent.sort_by_key(|v| (Reverse(v.book.created_at), v.book.id));
        let recent_books = recent
            .into_iter()
            .take(RECENT_BOOKS)
            .map(BookSummary::from)
            .collect();

        let mut rated: Vec<&BookView> = views.iter().filter(|v| v.review_count > 0).collect();
        rated.sort_by(|a, b| rank_order(a, b));
        let top_rated_books: Vec<RankedBook> = rated
            .into_iter()
            .take(TOP_RATED_BOOKS)
            .map(RankedBook::from)
            .collect();

        let statistics = Statistics {
            total_books: views.len(),
            total_genres: genre_distribution.len(),
            average_rating,
            genre_distribution,
            year_distribution,
            recent_books,
            top_rated_books,
        };

        tracing::info!(
            total_books = statistics.total_books,
            total_genres = statistics.total_genres,
            review_count = score_count,
            "Catalog statistics computed"
        );

        Ok(statistics)
    }
}

/// Books per genre, most common first (ties by genre name)
fn genre_distribution(views: &[BookView]) -> Vec<GenreCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for view in views {
        *counts.entry(view.book.genre.as_str()).or_default() += 1;
    }

    let mut distribution: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
    distribution
}

/// Books per publication year for the most recent years; undated books are skipped
fn year_distribution(views: &[BookView]) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for year in views.iter().filter_map(|v| v.book.publication_year) {
        *counts.entry(year).or_default() += 1;
    }

    counts
        .into_iter()
        .rev()
        .take(YEAR_BUCKETS)
        .map(|(year, count)| YearCount { year, count })
        .collect()
}
