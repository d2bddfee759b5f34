use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .fallback(handlers::route_not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Authors
        .route(
            "/authors",
            get(handlers::list_authors).post(handlers::create_author),
        )
        .route(
            "/authors/:id",
            get(handlers::get_author)
                .put(handlers::update_author)
                .delete(handlers::delete_author),
        )
        // Books
        .route("/books", get(handlers::list_books).post(handlers::create_book))
        .route("/books/rankings", get(handlers::rankings))
        .route("/books/search", get(handlers::search_books))
        .route(
            "/books/statistics/overview",
            get(handlers::statistics_overview),
        )
        .route("/books/recommendations/:id", get(handlers::recommendations))
        .route(
            "/books/:id",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .route("/books/:id/stats", get(handlers::book_stats))
        // Reviews
        .route(
            "/reviews",
            get(handlers::list_reviews).post(handlers::create_review),
        )
        .route("/reviews/book/:id", get(handlers::list_book_reviews))
        .route(
            "/reviews/:id",
            get(handlers::get_review)
                .put(handlers::update_review)
                .delete(handlers::delete_review),
        )
}
