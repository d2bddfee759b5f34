//! Deterministic catalog builder shared by service tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::db::InMemoryStore;
use crate::models::{Author, Book, Review};

pub struct CatalogBuilder {
    authors: Vec<Author>,
    books: Vec<Book>,
    reviews: Vec<Review>,
    tick: i64,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            authors: Vec::new(),
            books: Vec::new(),
            reviews: Vec::new(),
            tick: 0,
        }
    }

    /// Every record gets a strictly later timestamp than the previous one
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(self.tick)
    }

    pub fn author(&mut self, name: &str) -> Uuid {
        let mut author = Author::new(name, "Portuguese");
        author.created_at = self.next_timestamp();
        let id = author.id;
        self.authors.push(author);
        id
    }

    pub fn book(&mut self, title: &str, author_id: Uuid, genre: &str, year: Option<i32>) -> Uuid {
        let mut book = Book::new(title, author_id, genre);
        book.publication_year = year;
        book.created_at = self.next_timestamp();
        let id = book.id;
        self.books.push(book);
        id
    }

    pub fn review(&mut self, book_id: Uuid, score: u8) -> Uuid {
        let mut review = Review::new(book_id, "reader", score);
        review.created_at = self.next_timestamp();
        let id = review.id;
        self.reviews.push(review);
        id
    }

    pub fn build(self) -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::seeded(self.authors, self.books, self.reviews))
    }
}
