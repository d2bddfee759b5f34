use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog book, referencing exactly one author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub genre: String,
    pub publication_year: Option<i32>,
    pub isbn: Option<String>,
    pub summary: Option<String>,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a book
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author_id: Uuid,
    pub genre: String,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Partial book update; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author_id: Option<Uuid>,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    pub isbn: Option<String>,
    pub summary: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl Book {
    /// Creates a new book stamped with the current time
    pub fn new(title: impl Into<String>, author_id: Uuid, genre: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author_id,
            genre: genre.into(),
            publication_year: None,
            isbn: None,
            summary: None,
            keywords: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, update: BookUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(author_id) = update.author_id {
            self.author_id = author_id;
        }
        if let Some(genre) = update.genre {
            self.genre = genre;
        }
        if update.publication_year.is_some() {
            self.publication_year = update.publication_year;
        }
        if update.isbn.is_some() {
            self.isbn = update.isbn;
        }
        if update.summary.is_some() {
            self.summary = update.summary;
        }
        if let Some(keywords) = update.keywords {
            self.keywords = keywords;
        }
    }
}

impl From<NewBook> for Book {
    fn from(new: NewBook) -> Self {
        Self {
            publication_year: new.publication_year,
            isbn: new.isbn,
            summary: new.summary,
            keywords: new.keywords,
            ..Book::new(new.title, new.author_id, new.genre)
        }
    }
}
