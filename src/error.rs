//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error type
///
/// Workflow guards return these as values; nothing here is process-fatal.
/// The `IntoResponse` impl is the single place outcomes become status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing entity, or an entity the acting user may not see.
    /// Covers both so existence is not leaked to non-owners.
    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    /// Duplicate line item, username already taken, etc.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Wrong status, missing precondition field, invalid target status.
    #[error("guard violation: {0}")]
    Guard(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            // Workflow guard failures surface as 405, a quirk clients rely on.
            AppError::Guard(_) => (StatusCode::METHOD_NOT_ALLOWED, self.to_string()),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl AppError {
    pub fn guard(msg: impl Into<String>) -> Self {
        Self::Guard(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
