//! Entity store seam.
//!
//! The derived-view services only ever read through [`CatalogReader`]; the CRUD
//! layer writes through [`CatalogWriter`]. Both return immutable snapshots.

use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{Author, Book, Review},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{create_pool, PgStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to books, authors and reviews
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogReader: Send + Sync {
    async fn get_book(&self, id: Uuid) -> StoreResult<Option<Book>>;

    /// All books, oldest first (ties broken by id)
    async fn list_books(&self) -> StoreResult<Vec<Book>>;

    async fn get_author(&self, id: Uuid) -> StoreResult<Option<Author>>;

    async fn list_authors(&self) -> StoreResult<Vec<Author>>;

    async fn get_review(&self, id: Uuid) -> StoreResult<Option<Review>>;

    /// Reviews of one book, newest first
    async fn list_reviews_for_book(&self, book_id: Uuid) -> StoreResult<Vec<Review>>;

    /// Every review in the catalog, newest first
    async fn list_all_reviews(&self) -> StoreResult<Vec<Review>>;
}

/// Write access to the catalog
///
/// Update and delete methods return `false` when no record matched.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn insert_author(&self, author: &Author) -> StoreResult<()>;

    async fn update_author(&self, author: &Author) -> StoreResult<bool>;

    /// Fails with [`StoreError::StillReferenced`] while a book points at the author
    async fn delete_author(&self, id: Uuid) -> StoreResult<bool>;

    async fn count_books_by_author(&self, author_id: Uuid) -> StoreResult<u64>;

    async fn insert_book(&self, book: &Book) -> StoreResult<()>;

    async fn update_book(&self, book: &Book) -> StoreResult<bool>;

    /// Removes the book together with all of its reviews
    async fn delete_book(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_review(&self, review: &Review) -> StoreResult<()>;

    async fn update_review(&self, review: &Review) -> StoreResult<bool>;

    async fn delete_review(&self, id: Uuid) -> StoreResult<bool>;
}
