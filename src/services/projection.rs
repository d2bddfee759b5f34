//! Join projection: books joined with author names and rating aggregates.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{CatalogReader, StoreResult},
    error::{AppError, AppResult, StoreResultExt},
    models::{Book, BookView, RatingStats},
    services::ratings::aggregate,
};

/// Name shown for books whose author record no longer exists
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Author names and review scores for the whole catalog, loaded in two store
/// calls so that projecting every book needs no per-book round trip.
pub struct CatalogIndex {
    author_names: HashMap<Uuid, String>,
    scores_by_book: HashMap<Uuid, Vec<u8>>,
}

impl CatalogIndex {
    pub async fn load(store: &dyn CatalogReader) -> StoreResult<Self> {
        let authors = store.list_authors().await?;
        let reviews = store.list_all_reviews().await?;

        let author_names = authors.into_iter().map(|a| (a.id, a.name)).collect();

        let mut scores_by_book: HashMap<Uuid, Vec<u8>> = HashMap::new();
        for review in reviews {
            scores_by_book
                .entry(review.book_id)
                .or_default()
                .push(review.score);
        }

        Ok(Self {
            author_names,
            scores_by_book,
        })
    }

    /// Resolves an author id, falling back to [`UNKNOWN_AUTHOR`]
    pub fn author_name(&self, author_id: Uuid) -> String {
        match self.author_names.get(&author_id) {
            Some(name) => name.clone(),
            None => {
                tracing::warn!(author_id = %author_id, "Book references a missing author");
                UNKNOWN_AUTHOR.to_string()
            }
        }
    }

    pub fn rating(&self, book_id: Uuid) -> RatingStats {
        self.scores_by_book
            .get(&book_id)
            .map(|scores| aggregate(scores))
            .unwrap_or_default()
    }

    /// Every review score in the catalog
    pub fn all_scores(&self) -> impl Iterator<Item = u8> + '_ {
        self.scores_by_book.values().flatten().copied()
    }

    pub fn project(&self, book: Book) -> BookView {
        let author_name = self.author_name(book.author_id);
        let rating = self.rating(book.id);
        BookView {
            book,
            author_name,
            average_score: rating.mean,
            review_count: rating.count,
        }
    }
}

/// Builds denormalized [`BookView`]s from the entity store
#[derive(Clone)]
pub struct Projector {
    store: Arc<dyn CatalogReader>,
}

impl Projector {
    pub fn new(store: Arc<dyn CatalogReader>) -> Self {
        Self { store }
    }

    /// Projects a single book, resolving only its own author and reviews
    pub async fn project_book(&self, book: Book) -> AppResult<BookView> {
        let author = self
            .store
            .get_author(book.author_id)
            .await
            .during("project_book")?;
        let reviews = self
            .store
            .list_reviews_for_book(book.id)
            .await
            .during("project_book")?;

        let author_name = match author {
            Some(author) => author.name,
            None => {
                tracing::warn!(
                    book_id = %book.id,
                    author_id = %book.author_id,
                    "Book references a missing author"
                );
                UNKNOWN_AUTHOR.to_string()
            }
        };
        let scores: Vec<u8> = reviews.iter().map(|r| r.score).collect();
        let rating = aggregate(&scores);

        Ok(BookView {
            book,
            author_name,
            average_score: rating.mean,
            review_count: rating.count,
        })
    }

    /// Projects every book in the catalog, oldest first
    pub async fn project_all(&self) -> AppResult<Vec<BookView>> {
        let books = self.store.list_books().await.during("project_all")?;
        let index = CatalogIndex::load(self.store.as_ref())
            .await
            .during("project_all")?;

        tracing::debug!(book_count = books.len(), "Projecting catalog");

        Ok(books.into_iter().map(|book| index.project(book)).collect())
    }

    /// Looks up and projects one book; fails with `NotFound` for an unknown id
    pub async fn book_view(&self, book_id: Uuid) -> AppResult<BookView> {
        let book = self
            .store
            .get_book(book_id)
            .await
            .during("book_view")?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))?;

        self.project_book(book).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CatalogWriter, MockCatalogReader};
    use crate::error::StoreError;
    use crate::services::fixtures::CatalogBuilder;

    #[tokio::test]
    async fn test_project_book_joins_author_and_rating() {
        let mut catalog = CatalogBuilder::new();
        let author = catalog.author("José Saramago");
        let book = catalog.book("Levantado do Chão", author, "Novel", Some(1980));
        catalog.review(book, 4);
        catalog.review(book, 5);
        let projector = Projector::new(catalog.build());

        let view = projector.book_view(book).await.unwrap();
        assert_eq!(view.author_name, "José Saramago");
        assert_eq!(view.review_count, 2);
        assert!((view.average_score - 4.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_project_book_without_reviews_is_zero() {
        let mut catalog = CatalogBuilder::new();
        let author = catalog.author("Agustina Bessa-Luís");
        let book = catalog.book("A Sibila", author, "Novel", Some(1954));
        let projector = Projector::new(catalog.build());

        let view = projector.book_view(book).await.unwrap();
        assert_eq!(view.review_count, 0);
        assert_eq!(view.average_score, 0.0);
    }

    #[tokio::test]
    async fn test_missing_author_uses_placeholder() {
        let mut catalog = CatalogBuilder::new();
        let orphan = catalog.book("Orphan", Uuid::new_v4(), "Novel", None);
        let projector = Projector::new(catalog.build());

        let single = projector.book_view(orphan).await.unwrap();
        assert_eq!(single.author_name, UNKNOWN_AUTHOR);

        let all = projector.project_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].author_name, UNKNOWN_AUTHOR);
    }

    #[tokio::test]
    async fn test_project_all_matches_single_projection() {
        let mut catalog = CatalogBuilder::new();
        let a = catalog.author("Eça de Queirós");
        let b = catalog.author("Camilo Castelo Branco");
        let maias = catalog.book("Os Maias", a, "Novel", Some(1888));
        let amor = catalog.book("Amor de Perdição", b, "Novel", Some(1862));
        catalog.review(maias, 5);
        catalog.review(maias, 3);
        catalog.review(amor, 2);
        let projector = Projector::new(catalog.build());

        let all = projector.project_all().await.unwrap();
        assert_eq!(all.len(), 2);
        for view in &all {
            let single = projector.book_view(view.book.id).await.unwrap();
            assert_eq!(&single, view);
        }
        assert_eq!(all[0].book.title, "Os Maias");
        assert_eq!(all[0].review_count, 2);
        assert_eq!(all[1].author_name, "Camilo Castelo Branco");
    }

    #[tokio::test]
    async fn test_project_all_after_delete_drops_reviews() {
        let mut catalog = CatalogBuilder::new();
        let author = catalog.author("Florbela Espanca");
        let kept = catalog.book("Charneca em Flor", author, "Poetry", Some(1931));
        let removed = catalog.book("Livro de Mágoas", author, "Poetry", Some(1919));
        catalog.review(removed, 5);
        catalog.review(kept, 4);
        let store = catalog.build();
        let projector = Projector::new(store.clone());

        store.delete_book(removed).await.unwrap();

        let all = projector.project_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].book.id, kept);
        assert_eq!(all[0].review_count, 1);
        let remaining = store.list_all_reviews().await.unwrap();
        assert!(remaining.iter().all(|r| r.book_id != removed));
    }

    #[tokio::test]
    async fn test_book_view_unknown_id() {
        let projector = Projector::new(CatalogBuilder::new().build());
        let result = projector.book_view(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure_is_annotated() {
        let mut store = MockCatalogReader::new();
        store
            .expect_list_books()
            .returning(|| Err(StoreError::Malformed("truncated row".to_string())));

        let projector = Projector::new(Arc::new(store));
        let err = projector.project_all().await.unwrap_err();

        match err {
            AppError::Store { operation, source } => {
                assert_eq!(operation, "project_all");
                assert!(matches!(source, StoreError::Malformed(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
