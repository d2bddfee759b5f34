use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use super::{CatalogReader, CatalogWriter, StoreResult};
use crate::{
    error::StoreError,
    models::{Author, Book, Review, MAX_SCORE, MIN_SCORE},
};

/// Creates a PostgreSQL connection pool and applies pending migrations
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Catalog store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOK_COLUMNS: &str =
    "id, title, author_id, genre, publication_year, isbn, summary, keywords, created_at";
const AUTHOR_COLUMNS: &str = "id, name, nationality, birth_year, biography, created_at";
const REVIEW_COLUMNS: &str = "id, book_id, reviewer_name, score, comment, created_at";

#[derive(FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author_id: Uuid,
    genre: String,
    publication_year: Option<i32>,
    isbn: Option<String>,
    summary: Option<String>,
    keywords: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author_id: row.author_id,
            genre: row.genre,
            publication_year: row.publication_year,
            isbn: row.isbn,
            summary: row.summary,
            keywords: row.keywords,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct AuthorRow {
    id: Uuid,
    name: String,
    nationality: String,
    birth_year: Option<i32>,
    biography: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author {
            id: row.id,
            name: row.name,
            nationality: row.nationality,
            birth_year: row.birth_year,
            biography: row.biography,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ReviewRow {
    id: Uuid,
    book_id: Uuid,
    reviewer_name: String,
    score: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = StoreError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let score = u8::try_from(row.score)
            .ok()
            .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
            .ok_or_else(|| {
                StoreError::Malformed(format!("review {} has score {}", row.id, row.score))
            })?;

        Ok(Review {
            id: row.id,
            book_id: row.book_id,
            reviewer_name: row.reviewer_name,
            score,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

const FOREIGN_KEY_VIOLATION: &str = "23503";

fn is_foreign_key_violation(code: Option<&str>) -> bool {
    code == Some(FOREIGN_KEY_VIOLATION)
}

/// Maps a rejected delete of a still-referenced row to [`StoreError::StillReferenced`]
fn delete_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if is_foreign_key_violation(db.code().as_deref()) {
            let constraint = db.constraint().unwrap_or("foreign key");
            return StoreError::StillReferenced(constraint.to_string());
        }
    }
    StoreError::Database(err)
}

fn into_reviews(rows: Vec<ReviewRow>) -> StoreResult<Vec<Review>> {
    rows.into_iter().map(Review::try_from).collect()
}

#[async_trait::async_trait]
impl CatalogReader for PgStore {
    async fn get_book(&self, id: Uuid) -> StoreResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Book::from))
    }

    async fn list_books(&self) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn get_author(&self, id: Uuid) -> StoreResult<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Author::from))
    }

    async fn list_authors(&self) -> StoreResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, AuthorRow>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Author::from).collect())
    }

    async fn get_review(&self, id: Uuid) -> StoreResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Review::try_from).transpose()
    }

    async fn list_reviews_for_book(&self, book_id: Uuid) -> StoreResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE book_id = $1 ORDER BY created_at DESC, id"
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        into_reviews(rows)
    }

    async fn list_all_reviews(&self) -> StoreResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_reviews(rows)
    }
}

#[async_trait::async_trait]
impl CatalogWriter for PgStore {
    async fn insert_author(&self, author: &Author) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO authors (id, name, nationality, birth_year, biography, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(author.id)
        .bind(&author.name)
        .bind(&author.nationality)
        .bind(author.birth_year)
        .bind(&author.biography)
        .bind(author.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_author(&self, author: &Author) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE authors SET name = $2, nationality = $3, birth_year = $4, biography = $5
            WHERE id = $1
            "#,
        )
        .bind(author.id)
        .bind(&author.name)
        .bind(&author.nationality)
        .bind(author.birth_year)
        .bind(&author.biography)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_author(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(delete_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_books_by_author(&self, author_id: Uuid) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn insert_book(&self, book: &Book) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO books (
                id, title, author_id, genre, publication_year, isbn, summary, keywords, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.genre)
        .bind(book.publication_year)
        .bind(&book.isbn)
        .bind(&book.summary)
        .bind(&book.keywords)
        .bind(book.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_book(&self, book: &Book) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = $2, author_id = $3, genre = $4, publication_year = $5,
                isbn = $6, summary = $7, keywords = $8
            WHERE id = $1
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.genre)
        .bind(book.publication_year)
        .bind(&book.isbn)
        .bind(&book.summary)
        .bind(&book.keywords)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_book(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reviews WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_review(&self, review: &Review) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, book_id, reviewer_name, score, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(review.id)
        .bind(review.book_id)
        .bind(&review.reviewer_name)
        .bind(i16::from(review.score))
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_review(&self, review: &Review) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE reviews SET reviewer_name = $2, score = $3, comment = $4 WHERE id = $1",
        )
        .bind(review.id)
        .bind(&review.reviewer_name)
        .bind(i16::from(review.score))
        .bind(&review.comment)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_review(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_row(score: i16) -> ReviewRow {
        ReviewRow {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            reviewer_name: "ana".to_string(),
            score,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_review_row_in_range() {
        let review = Review::try_from(review_row(4)).unwrap();
        assert_eq!(review.score, 4);
    }

    #[test]
    fn test_foreign_key_violation_code() {
        assert!(is_foreign_key_violation(Some("23503")));
        assert!(!is_foreign_key_violation(Some("23505")));
        assert!(!is_foreign_key_violation(None));
    }

    #[test]
    fn test_delete_error_keeps_other_failures() {
        let err = delete_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_review_row_out_of_range_is_malformed() {
        for score in [0, 6, -3] {
            let result = Review::try_from(review_row(score));
            assert!(matches!(result, Err(StoreError::Malformed(_))));
        }
    }
}
