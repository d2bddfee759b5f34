mod author;
mod book;
mod review;
mod views;

pub use author::{Author, AuthorUpdate, NewAuthor};
pub use book::{Book, BookUpdate, NewBook};
pub use review::{NewReview, Review, ReviewUpdate, MAX_SCORE, MIN_SCORE};
pub use views::{
    BookSummary, BookView, GenreCount, MatchReason, RankedBook, RatingStats, Recommendation,
    RecommendationResult, ReviewView, Statistics, YearCount,
};
