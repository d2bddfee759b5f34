use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures raised by an entity store implementation
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Record still referenced: {0}")]
    StillReferenced(String),
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error during {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Store { .. } => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Tags a store failure with the operation that was running when it surfaced
pub trait StoreResultExt<T> {
    fn during(self, operation: &'static str) -> AppResult<T>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn during(self, operation: &'static str) -> AppResult<T> {
        self.map_err(|source| AppError::Store { operation, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_during_annotates_operation() {
        let result: Result<(), StoreError> = Err(StoreError::Malformed("bad score".to_string()));
        let err = result.during("overview").unwrap_err();

        match &err {
            AppError::Store { operation, source } => {
                assert_eq!(*operation, "overview");
                assert!(matches!(source, StoreError::Malformed(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Store error during overview: Malformed record: bad score"
        );
    }

    #[test]
    fn test_status_codes() {
        let not_found = AppError::NotFound("book".to_string()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = AppError::Validation("score".to_string()).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let store = AppError::Store {
            operation: "recommend",
            source: StoreError::Malformed("x".to_string()),
        }
        .into_response();
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
