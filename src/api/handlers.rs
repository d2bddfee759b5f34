use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        Author, AuthorUpdate, Book, BookUpdate, BookView, NewAuthor, NewBook, NewReview,
        RankedBook, RatingStats, RecommendationResult, Review, ReviewUpdate, ReviewView,
        Statistics,
    },
    services::{SearchFilter, DEFAULT_LIMIT},
};

use super::AppState;

const MAX_RECOMMENDATIONS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
}

/// Service description
pub async fn index() -> Json<Value> {
    Json(json!({
        "name": "book-catalog-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "authors": "/api/v1/authors",
            "books": "/api/v1/books",
            "reviews": "/api/v1/reviews"
        }
    }))
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Fallback for unmatched routes
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}

// Authors

pub async fn list_authors(State(state): State<AppState>) -> AppResult<Json<Vec<Author>>> {
    Ok(Json(state.catalog.list_authors().await?))
}

pub async fn create_author(
    State(state): State<AppState>,
    Json(request): Json<NewAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.catalog.create_author(request).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Author>> {
    Ok(Json(state.catalog.get_author(id).await?))
}

pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AuthorUpdate>,
) -> AppResult<Json<Author>> {
    Ok(Json(state.catalog.update_author(id, request).await?))
}

pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Books

/// All books joined with author name and rating
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookView>>> {
    Ok(Json(state.projector.project_all().await?))
}

pub async fn create_book(
    State(state): State<AppState>,
    Json(request): Json<NewBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.catalog.create_book(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookView>> {
    Ok(Json(state.projector.book_view(id).await?))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<BookUpdate>,
) -> AppResult<Json<Book>> {
    Ok(Json(state.catalog.update_book(id, request).await?))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn book_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RatingStats>> {
    Ok(Json(state.ratings.book_stats(id).await?))
}

pub async fn rankings(State(state): State<AppState>) -> AppResult<Json<Vec<RankedBook>>> {
    Ok(Json(state.browser.rankings().await?))
}

pub async fn search_books(
    State(state): State<AppState>,
    Query(filter): Query<SearchFilter>,
) -> AppResult<Json<Vec<BookView>>> {
    Ok(Json(state.browser.search(&filter).await?))
}

pub async fn statistics_overview(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<Statistics>> {
    tracing::info!(request_id = %request_id, "Computing catalog statistics");
    Ok(Json(state.statistics.overview().await?))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResult>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_RECOMMENDATIONS).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_RECOMMENDATIONS
        )));
    }

    tracing::info!(
        request_id = %request_id,
        book_id = %id,
        limit,
        "Processing recommendation request"
    );

    Ok(Json(state.recommender.recommend(id, limit).await?))
}

// Reviews

pub async fn list_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<ReviewView>>> {
    Ok(Json(state.catalog.list_reviews().await?))
}

pub async fn list_book_reviews(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(state.catalog.list_reviews_for_book(book_id).await?))
}

pub async fn create_review(
    State(state): State<AppState>,
    Json(request): Json<NewReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state.catalog.create_review(request).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.catalog.get_review(id).await?))
}

pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewUpdate>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.catalog.update_review(id, request).await?))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.catalog.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
