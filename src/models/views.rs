//! Derived, never-persisted views assembled from books, authors and reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Book, Review};

/// A book joined with its author name and rating aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookView {
    #[serde(flatten)]
    pub book: Book,
    pub author_name: String,
    /// 0 when the book has no reviews
    pub average_score: f64,
    pub review_count: usize,
}

/// Count/mean/extremes of one book's review scores. All zeros when unrated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingStats {
    pub mean: f64,
    pub count: usize,
    pub max: u8,
    pub min: u8,
}

/// Compact book listing used inside aggregate views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub genre: String,
    pub publication_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<&BookView> for BookSummary {
    fn from(view: &BookView) -> Self {
        Self {
            id: view.book.id,
            title: view.book.title.clone(),
            author_id: view.book.author_id,
            author_name: view.author_name.clone(),
            genre: view.book.genre.clone(),
            publication_year: view.book.publication_year,
            created_at: view.book.created_at,
        }
    }
}

/// A book ranked by its rating aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedBook {
    #[serde(flatten)]
    pub book: BookSummary,
    pub average_score: f64,
    pub review_count: usize,
}

impl From<&BookView> for RankedBook {
    fn from(view: &BookView) -> Self {
        Self {
            book: BookSummary::from(view),
            average_score: view.average_score,
            review_count: view.review_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Catalog-wide statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    pub total_books: usize,
    pub total_genres: usize,
    /// Mean of every review score in the catalog, one decimal place
    pub average_rating: f64,
    pub genre_distribution: Vec<GenreCount>,
    pub year_distribution: Vec<YearCount>,
    pub recent_books: Vec<BookSummary>,
    pub top_rated_books: Vec<RankedBook>,
}

/// Why a candidate was recommended
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchReason {
    #[serde(rename = "same author and genre")]
    SameAuthorAndGenre,
    #[serde(rename = "same genre")]
    SameGenre,
    #[serde(rename = "same author")]
    SameAuthor,
    #[serde(rename = "similar book")]
    Similar,
}

impl MatchReason {
    pub fn from_matches(same_genre: bool, same_author: bool) -> Self {
        match (same_genre, same_author) {
            (true, true) => MatchReason::SameAuthorAndGenre,
            (true, false) => MatchReason::SameGenre,
            (false, true) => MatchReason::SameAuthor,
            (false, false) => MatchReason::Similar,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(flatten)]
    pub book: BookSummary,
    pub average_score: f64,
    pub review_count: usize,
    pub similarity_score: f64,
    pub reason: MatchReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub target_book: BookView,
    pub recommendations: Vec<Recommendation>,
}

/// A review joined with the title of the book it belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub book_title: String,
}
