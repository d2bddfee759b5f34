//! Validated create/update/delete of catalog records.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{CatalogReader, CatalogWriter},
    error::{AppError, AppResult, StoreError, StoreResultExt},
    models::{
        Author, AuthorUpdate, Book, BookUpdate, NewAuthor, NewBook, NewReview, Review,
        ReviewUpdate, ReviewView, MAX_SCORE, MIN_SCORE,
    },
};

fn require(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_if_present(value: Option<&str>, field: &str) -> AppResult<()> {
    match value {
        Some(v) => require(v, field),
        None => Ok(()),
    }
}

fn validate_score(score: i64) -> AppResult<u8> {
    u8::try_from(score)
        .ok()
        .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "score must be between {} and {}",
                MIN_SCORE, MAX_SCORE
            ))
        })
}

fn not_found(kind: &str, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {} not found", kind, id))
}

/// Authors, books and reviews with the referential checks the store relies on
#[derive(Clone)]
pub struct CatalogService {
    reader: Arc<dyn CatalogReader>,
    writer: Arc<dyn CatalogWriter>,
}

impl CatalogService {
    pub fn new(reader: Arc<dyn CatalogReader>, writer: Arc<dyn CatalogWriter>) -> Self {
        Self { reader, writer }
    }

    async fn ensure_author(&self, author_id: Uuid) -> AppResult<()> {
        let exists = self
            .reader
            .get_author(author_id)
            .await
            .during("ensure_author")?
            .is_some();
        if !exists {
            return Err(AppError::Validation(format!(
                "Author {} does not exist",
                author_id
            )));
        }
        Ok(())
    }

    // Authors

    pub async fn create_author(&self, new: NewAuthor) -> AppResult<Author> {
        require(&new.name, "name")?;
        require(&new.nationality, "nationality")?;

        let author = Author::from(new);
        self.writer
            .insert_author(&author)
            .await
            .during("create_author")?;

        tracing::info!(author_id = %author.id, "Author created");
        Ok(author)
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.reader.list_authors().await.during("list_authors")
    }

    pub async fn get_author(&self, id: Uuid) -> AppResult<Author> {
        self.reader
            .get_author(id)
            .await
            .during("get_author")?
            .ok_or_else(|| not_found("Author", id))
    }

    pub async fn update_author(&self, id: Uuid, update: AuthorUpdate) -> AppResult<Author> {
        require_if_present(update.name.as_deref(), "name")?;
        require_if_present(update.nationality.as_deref(), "nationality")?;

        let mut author = self.get_author(id).await?;
        author.apply(update);

        if !self
            .writer
            .update_author(&author)
            .await
            .during("update_author")?
        {
            return Err(not_found("Author", id));
        }
        Ok(author)
    }

    /// Rejected while any book still references the author
    pub async fn delete_author(&self, id: Uuid) -> AppResult<()> {
        let books = self
            .writer
            .count_books_by_author(id)
            .await
            .during("delete_author")?;
        if books > 0 {
            return Err(AppError::Validation(format!(
                "Author {} still has {} book(s)",
                id, books
            )));
        }

        let deleted = match self.writer.delete_author(id).await {
            Err(StoreError::StillReferenced(detail)) => {
                return Err(AppError::Validation(format!(
                    "Author {} is still referenced: {}",
                    id, detail
                )))
            }
            other => other.during("delete_author")?,
        };
        if !deleted {
            return Err(not_found("Author", id));
        }

        tracing::info!(author_id = %id, "Author deleted");
        Ok(())
    }

    // Books

    pub async fn create_book(&self, new: NewBook) -> AppResult<Book> {
        require(&new.title, "title")?;
        require(&new.genre, "genre")?;
        self.ensure_author(new.author_id).await?;

        let book = Book::from(new);
        self.writer.insert_book(&book).await.during("create_book")?;

        tracing::info!(book_id = %book.id, author_id = %book.author_id, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: Uuid, update: BookUpdate) -> AppResult<Book> {
        require_if_present(update.title.as_deref(), "title")?;
        require_if_present(update.genre.as_deref(), "genre")?;

        let mut book = self
            .reader
            .get_book(id)
            .await
            .during("update_book")?
            .ok_or_else(|| not_found("Book", id))?;

        if let Some(author_id) = update.author_id {
            self.ensure_author(author_id).await?;
        }
        book.apply(update);

        if !self.writer.update_book(&book).await.during("update_book")? {
            return Err(not_found("Book", id));
        }
        Ok(book)
    }

    /// Deletes the book and every review of it
    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        if !self.writer.delete_book(id).await.during("delete_book")? {
            return Err(not_found("Book", id));
        }

        tracing::info!(book_id = %id, "Book and its reviews deleted");
        Ok(())
    }

    // Reviews

    pub async fn create_review(&self, new: NewReview) -> AppResult<Review> {
        require(&new.reviewer_name, "reviewer_name")?;
        let score = validate_score(new.score)?;

        let book_exists = self
            .reader
            .get_book(new.book_id)
            .await
            .during("create_review")?
            .is_some();
        if !book_exists {
            return Err(AppError::Validation(format!(
                "Book {} does not exist",
                new.book_id
            )));
        }

        let mut review = Review::new(new.book_id, new.reviewer_name, score);
        review.comment = new.comment;
        self.writer
            .insert_review(&review)
            .await
            .during("create_review")?;

        tracing::info!(review_id = %review.id, book_id = %review.book_id, "Review created");
        Ok(review)
    }

    /// Every review with its book title, newest first
    ///
    /// Reviews whose book no longer exists are skipped.
    pub async fn list_reviews(&self) -> AppResult<Vec<ReviewView>> {
        let titles: HashMap<Uuid, String> = self
            .reader
            .list_books()
            .await
            .during("list_reviews")?
            .into_iter()
            .map(|book| (book.id, book.title))
            .collect();

        let reviews = self
            .reader
            .list_all_reviews()
            .await
            .during("list_reviews")?;

        Ok(reviews
            .into_iter()
            .filter_map(|review| {
                let book_title = titles.get(&review.book_id)?.clone();
                Some(ReviewView { review, book_title })
            })
            .collect())
    }

    pub async fn list_reviews_for_book(&self, book_id: Uuid) -> AppResult<Vec<Review>> {
        self.reader
            .list_reviews_for_book(book_id)
            .await
            .during("list_reviews_for_book")
    }

    pub async fn get_review(&self, id: Uuid) -> AppResult<Review> {
        self.reader
            .get_review(id)
            .await
            .during("get_review")?
            .ok_or_else(|| not_found("Review", id))
    }

    pub async fn update_review(&self, id: Uuid, update: ReviewUpdate) -> AppResult<Review> {
        require_if_present(update.reviewer_name.as_deref(), "reviewer_name")?;
        let score = update.score.map(validate_score).transpose()?;

        let mut review = self.get_review(id).await?;
        if let Some(name) = update.reviewer_name {
            review.reviewer_name = name;
        }
        if let Some(score) = score {
            review.score = score;
        }
        if update.comment.is_some() {
            review.comment = update.comment;
        }

        if !self
            .writer
            .update_review(&review)
            .await
            .during("update_review")?
        {
            return Err(not_found("Review", id));
        }
        Ok(review)
    }

    pub async fn delete_review(&self, id: Uuid) -> AppResult<()> {
        if !self.writer.delete_review(id).await.during("delete_review")? {
            return Err(not_found("Review", id));
        }
        Ok(())
    }
}
