use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogReader, CatalogWriter, StoreResult};
use crate::{
    error::StoreError,
    models::{Author, Book, Review},
};

/// Process-local catalog store
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    authors: HashMap<Uuid, Author>,
    books: HashMap<Uuid, Book>,
    reviews: HashMap<Uuid, Review>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given records as-is
    pub fn seeded(authors: Vec<Author>, books: Vec<Book>, reviews: Vec<Review>) -> Self {
        let inner = StoreInner {
            authors: authors.into_iter().map(|a| (a.id, a)).collect(),
            books: books.into_iter().map(|b| (b.id, b)).collect(),
            reviews: reviews.into_iter().map(|r| (r.id, r)).collect(),
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }
}

fn newest_first(mut reviews: Vec<Review>) -> Vec<Review> {
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    reviews
}

#[async_trait::async_trait]
impl CatalogReader for InMemoryStore {
    async fn get_book(&self, id: Uuid) -> StoreResult<Option<Book>> {
        Ok(self.inner.read().await.books.get(&id).cloned())
    }

    async fn list_books(&self) -> StoreResult<Vec<Book>> {
        let inner = self.inner.read().await;
        let mut books: Vec<Book> = inner.books.values().cloned().collect();
        books.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(books)
    }

    async fn get_author(&self, id: Uuid) -> StoreResult<Option<Author>> {
        Ok(self.inner.read().await.authors.get(&id).cloned())
    }

    async fn list_authors(&self) -> StoreResult<Vec<Author>> {
        let inner = self.inner.read().await;
        let mut authors: Vec<Author> = inner.authors.values().cloned().collect();
        authors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(authors)
    }

    async fn get_review(&self, id: Uuid) -> StoreResult<Option<Review>> {
        Ok(self.inner.read().await.reviews.get(&id).cloned())
    }

    async fn list_reviews_for_book(&self, book_id: Uuid) -> StoreResult<Vec<Review>> {
        let inner = self.inner.read().await;
        let reviews = inner
            .reviews
            .values()
            .filter(|r| r.book_id == book_id)
            .cloned()
            .collect();
        Ok(newest_first(reviews))
    }

    async fn list_all_reviews(&self) -> StoreResult<Vec<Review>> {
        let inner = self.inner.read().await;
        Ok(newest_first(inner.reviews.values().cloned().collect()))
    }
}

#[async_trait::async_trait]
impl CatalogWriter for InMemoryStore {
    async fn insert_author(&self, author: &Author) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.authors.insert(author.id, author.clone());
        Ok(())
    }

    async fn update_author(&self, author: &Author) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.authors.get_mut(&author.id) {
            Some(existing) => {
                *existing = author.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_author(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        if let Some(book) = inner.books.values().find(|b| b.author_id == id) {
            return Err(StoreError::StillReferenced(format!("book {}", book.id)));
        }
        Ok(inner.authors.remove(&id).is_some())
    }

    async fn count_books_by_author(&self, author_id: Uuid) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .books
            .values()
            .filter(|b| b.author_id == author_id)
            .count() as u64)
    }

    async fn insert_book(&self, book: &Book) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.books.insert(book.id, book.clone());
        Ok(())
    }

    async fn update_book(&self, book: &Book) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.books.get_mut(&book.id) {
            Some(existing) => {
                *existing = book.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_book(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.books.remove(&id).is_none() {
            return Ok(false);
        }
        inner.reviews.retain(|_, review| review.book_id != id);
        Ok(true)
    }

    async fn insert_review(&self, review: &Review) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn update_review(&self, review: &Review) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.reviews.get_mut(&review.id) {
            Some(existing) => {
                *existing = review.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_review(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.reviews.remove(&id).is_some())
    }
}
