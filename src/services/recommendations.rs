use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::CatalogReader,
    error::{AppError, AppResult, StoreResultExt},
    models::{Book, BookSummary, MatchReason, Recommendation, RecommendationResult},
    services::{projection::CatalogIndex, random::RandomSource},
};

pub const DEFAULT_LIMIT: usize = 5;
pub const GENRE_BONUS: f64 = 3.0;
pub const AUTHOR_BONUS: f64 = 2.0;

/// Content-based recommender
///
/// Every other book is scored against the target by shared genre and author,
/// plus a diversity term in `[0, 1)` drawn from the configured [`RandomSource`]
/// once per candidate per call. The diversity term may lift an unrelated book
/// above a genre-only match; that is accepted behavior.
#[derive(Clone)]
pub struct Recommender {
    store: Arc<dyn CatalogReader>,
    random: Arc<dyn RandomSource>,
}

impl Recommender {
    pub fn new(store: Arc<dyn CatalogReader>, random: Arc<dyn RandomSource>) -> Self {
        Self { store, random }
    }

    pub async fn recommend(&self, book_id: Uuid, limit: usize) -> AppResult<RecommendationResult> {
        let target = self
            .store
            .get_book(book_id)
            .await
            .during("recommend")?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))?;

        let books = self.store.list_books().await.during("recommend")?;
        let index = CatalogIndex::load(self.store.as_ref())
            .await
            .during("recommend")?;

        let mut recommendations: Vec<Recommendation> = books
            .into_iter()
            .filter(|candidate| candidate.id != target.id)
            .map(|candidate| self.score(&target, candidate, &index))
            .collect();

        recommendations.sort_by(|a, b| {
            b.similarity_score
                .total_cmp(&a.similarity_score)
                .then(b.average_score.total_cmp(&a.average_score))
                .then(b.review_count.cmp(&a.review_count))
        });
        recommendations.truncate(limit);

        tracing::info!(
            book_id = %book_id,
            limit,
            returned = recommendations.len(),
            "Recommendations computed"
        );

        Ok(RecommendationResult {
            target_book: index.project(target),
            recommendations,
        })
    }

    fn score(&self, target: &Book, candidate: Book, index: &CatalogIndex) -> Recommendation {
        let same_genre = candidate.genre == target.genre;
        let same_author = candidate.author_id == target.author_id;

        let genre_bonus = if same_genre { GENRE_BONUS } else { 0.0 };
        let author_bonus = if same_author { AUTHOR_BONUS } else { 0.0 };
        let diversity = self.random.next_unit();

        let view = index.project(candidate);
        Recommendation {
            book: BookSummary::from(&view),
            average_score: view.average_score,
            review_count: view.review_count,
            similarity_score: genre_bonus + author_bonus + diversity,
            reason: MatchReason::from_matches(same_genre, same_author),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockCatalogReader;
    use crate::error::StoreError;
    use crate::services::fixtures::CatalogBuilder;
    use crate::services::random::{FixedSequence, ThreadRandom};

    fn fixed(values: &[f64]) -> Arc<dyn RandomSource> {
        Arc::new(FixedSequence::new(values.to_vec()))
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let recommender = Recommender::new(CatalogBuilder::new().build(), fixed(&[0.5]));
        let result = recommender.recommend(Uuid::new_v4(), DEFAULT_LIMIT).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_single_book_catalog_is_empty() {
        let mut catalog = CatalogBuilder::new();
        let author = catalog.author("Author");
        let only = catalog.book("Only", author, "Novel", None);
        let recommender = Recommender::new(catalog.build(), fixed(&[0.5]));

        let result = recommender.recommend(only, DEFAULT_LIMIT).await.unwrap();
        assert_eq!(result.target_book.book.id, only);
        assert!(result.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_target_never_recommended() {
        let mut catalog = CatalogBuilder::new();
        let author = catalog.author("Author");
        let target = catalog.book("Target", author, "Novel", None);
        for n in 0..6 {
            catalog.book(&format!("Other {n}"), author, "Novel", None);
        }
        let recommender = Recommender::new(catalog.build(), Arc::new(ThreadRandom));

        for _ in 0..20 {
            let result = recommender.recommend(target, 10).await.unwrap();
            assert_eq!(result.recommendations.len(), 6);
            assert!(result.recommendations.iter().all(|r| r.book.id != target));
        }
    }

    #[tokio::test]
    async fn test_scores_and_reasons() {
        let mut catalog = CatalogBuilder::new();
        let saramago = catalog.author("José Saramago");
        let pessoa = catalog.author("Fernando Pessoa");
        let target = catalog.book("Ensaio sobre a Cegueira", saramago, "Novel", None);
        let both = catalog.book("Ensaio sobre a Lucidez", saramago, "Novel", None);
        let genre_only = catalog.book("O Banqueiro Anarquista", pessoa, "Novel", None);
        let author_only = catalog.book("Terra do Pecado", saramago, "Drama", None);
        let neither = catalog.book("Mensagem", pessoa, "Poetry", None);
        // candidates draw in catalog order: both, genre_only, author_only, neither
        let recommender = Recommender::new(catalog.build(), fixed(&[0.1, 0.2, 0.3, 0.4]));

        let result = recommender.recommend(target, DEFAULT_LIMIT).await.unwrap();
        let ranked: Vec<(Uuid, MatchReason)> = result
            .recommendations
            .iter()
            .map(|r| (r.book.id, r.reason))
            .collect();
        assert_eq!(
            ranked,
            vec![
                (both, MatchReason::SameAuthorAndGenre),
                (genre_only, MatchReason::SameGenre),
                (author_only, MatchReason::SameAuthor),
                (neither, MatchReason::Similar),
            ]
        );

        let scores: Vec<f64> = result
            .recommendations
            .iter()
            .map(|r| r.similarity_score)
            .collect();
        let expected = [5.1, 3.2, 2.3, 0.4];
        for (score, want) in scores.iter().zip(expected) {
            assert!((score - want).abs() < 1e-9, "{score} != {want}");
        }
    }

    #[tokio::test]
    async fn test_reason_ignores_diversity_term() {
        let mut catalog = CatalogBuilder::new();
        let author = catalog.author("Author");
        let other_author = catalog.author("Other");
        let target = catalog.book("Target", author, "Novel", None);
        let both = catalog.book("Both", author, "Novel", None);
        let genre_only = catalog.book("Genre only", other_author, "Novel", None);
        let recommender = Recommender::new(catalog.build(), fixed(&[0.0, 0.99]));

        let result = recommender.recommend(target, DEFAULT_LIMIT).await.unwrap();
        let both_rec = result
            .recommendations
            .iter()
            .find(|r| r.book.id == both)
            .unwrap();
        let genre_rec = result
            .recommendations
            .iter()
            .find(|r| r.book.id == genre_only)
            .unwrap();
        assert_eq!(both_rec.reason, MatchReason::SameAuthorAndGenre);
        assert_eq!(genre_rec.reason, MatchReason::SameGenre);
    }

    #[tokio::test]
    async fn test_ties_break_by_rating_then_review_count() {
        let mut catalog = CatalogBuilder::new();
        let author = catalog.author("Author");
        let other = catalog.author("Other");
        let target = catalog.book("Target", author, "Novel", None);
        let unrated = catalog.book("Unrated", other, "Poetry", None);
        let one_five = catalog.book("One five", other, "Poetry", None);
        let two_fives = catalog.book("Two fives", other, "Poetry", None);
        let low = catalog.book("Low", other, "Poetry", None);
        catalog.review(one_five, 5);
        catalog.review(two_fives, 5);
        catalog.review(two_fives, 5);
        catalog.review(low, 1);
        let recommender = Recommender::new(catalog.build(), fixed(&[0.5]));

        let result = recommender.recommend(target, DEFAULT_LIMIT).await.unwrap();
        let ids: Vec<Uuid> = result.recommendations.iter().map(|r| r.book.id).collect();
        assert_eq!(ids, vec![two_fives, one_five, low, unrated]);
    }

    #[tokio::test]
    async fn test_diversity_orders_unrelated_candidates() {
        let mut catalog = CatalogBuilder::new();
        let author = catalog.author("Author");
        let other = catalog.author("Other");
        let target = catalog.book("Target", author, "Novel", None);
        let first = catalog.book("First", other, "Poetry", None);
        let second = catalog.book("Second", other, "Drama", None);
        let third = catalog.book("Third", other, "Essay", None);
        let recommender = Recommender::new(catalog.build(), fixed(&[0.2, 0.9, 0.5]));

        let result = recommender.recommend(target, DEFAULT_LIMIT).await.unwrap();
        let ids: Vec<Uuid> = result.recommendations.iter().map(|r| r.book.id).collect();
        assert_eq!(ids, vec![second, third, first]);
        assert!(result
            .recommendations
            .iter()
            .all(|r| r.reason == MatchReason::Similar));
    }

    #[tokio::test]
    async fn test_limit_truncates() {
        let mut catalog = CatalogBuilder::new();
        let author = catalog.author("Author");
        let target = catalog.book("Target", author, "Novel", None);
        for n in 0..8 {
            catalog.book(&format!("Other {n}"), author, "Novel", None);
        }
        let recommender = Recommender::new(catalog.build(), Arc::new(ThreadRandom));

        let result = recommender.recommend(target, 3).await.unwrap();
        assert_eq!(result.recommendations.len(), 3);

        let result = recommender.recommend(target, DEFAULT_LIMIT).await.unwrap();
        assert_eq!(result.recommendations.len(), DEFAULT_LIMIT);
    }

    #[tokio::test]
    async fn test_target_view_carries_rating() {
        let mut catalog = CatalogBuilder::new();
        let author = catalog.author("Author");
        let target = catalog.book("Target", author, "Novel", None);
        catalog.review(target, 4);
        catalog.review(target, 2);
        let recommender = Recommender::new(catalog.build(), fixed(&[0.5]));

        let result = recommender.recommend(target, DEFAULT_LIMIT).await.unwrap();
        assert_eq!(result.target_book.author_name, "Author");
        assert_eq!(result.target_book.review_count, 2);
        assert!((result.target_book.average_score - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let target = Book::new("Target", Uuid::new_v4(), "Novel");
        let target_id = target.id;
        let mut store = MockCatalogReader::new();
        store
            .expect_get_book()
            .returning(move |_| Ok(Some(target.clone())));
        store
            .expect_list_books()
            .returning(|| Err(StoreError::Malformed("x".to_string())));

        let recommender = Recommender::new(Arc::new(store), fixed(&[0.5]));
        let err = recommender
            .recommend(target_id, DEFAULT_LIMIT)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Store {
                operation: "recommend",
                ..
            }
        ));
        assert_eq!(err.to_string(), "Store error during recommend: Malformed record: x");
    }
}
