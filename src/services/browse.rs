use std::sync::Arc;

use serde::Deserialize;

use crate::{
    db::CatalogReader,
    error::{AppResult, StoreResultExt},
    models::{Book, BookView, RankedBook},
    services::{projection::CatalogIndex, statistics::rank_order},
};

/// Optional search criteria; every present criterion must match
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilter {
    /// Case-insensitive substring of the genre
    pub genre: Option<String>,
    /// Exact publication year
    pub year: Option<i32>,
    /// Case-insensitive substring of title, summary or any keyword
    pub keyword: Option<String>,
}

impl SearchFilter {
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(genre) = &self.genre {
            if !contains_ignore_case(&book.genre, genre) {
                return false;
            }
        }

        if let Some(year) = self.year {
            if book.publication_year != Some(year) {
                return false;
            }
        }

        if let Some(keyword) = &self.keyword {
            let in_title = contains_ignore_case(&book.title, keyword);
            let in_summary = book
                .summary
                .as_deref()
                .is_some_and(|s| contains_ignore_case(s, keyword));
            let in_keywords = book
                .keywords
                .iter()
                .any(|k| contains_ignore_case(k, keyword));
            if !(in_title || in_summary || in_keywords) {
                return false;
            }
        }

        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Catalog listings that rank or filter projected books
#[derive(Clone)]
pub struct CatalogBrowser {
    store: Arc<dyn CatalogReader>,
}

impl CatalogBrowser {
    pub fn new(store: Arc<dyn CatalogReader>) -> Self {
        Self { store }
    }

    /// Every book ranked by average score; unrated books sort last with 0
    pub async fn rankings(&self) -> AppResult<Vec<RankedBook>> {
        let books = self.store.list_books().await.during("rankings")?;
        let index = CatalogIndex::load(self.store.as_ref())
            .await
            .during("rankings")?;

        let mut views: Vec<BookView> = books.into_iter().map(|b| index.project(b)).collect();
        views.sort_by(rank_order);

        Ok(views.iter().map(RankedBook::from).collect())
    }

    pub async fn search(&self, filter: &SearchFilter) -> AppResult<Vec<BookView>> {
        let books = self.store.list_books().await.during("search")?;
        let matching: Vec<Book> = books.into_iter().filter(|b| filter.matches(b)).collect();

        tracing::debug!(
            matched = matching.len(),
            genre = ?filter.genre,
            year = ?filter.year,
            keyword = ?filter.keyword,
            "Catalog search"
        );

        if matching.is_empty() {
            return Ok(Vec::new());
        }

        let index = CatalogIndex::load(self.store.as_ref())
            .await
            .during("search")?;
        Ok(matching.into_iter().map(|b| index.project(b)).collect())
    }
}
