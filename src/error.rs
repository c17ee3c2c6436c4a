use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::shopping_list::RenderError;
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Shopping list rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::AlreadyListed(_) | StoreError::NotListed(_) | StoreError::Invalid(_) => {
                AppError::BadRequest(err.to_string())
            }
            StoreError::NotAuthor(_) => AppError::Forbidden(err.to_string()),
            StoreError::Poisoned | StoreError::Sqlite(_) => AppError::Internal(err.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "detail": self.to_string() })),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, json!({ "detail": message })),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "detail": message })),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "errors": message })),
            AppError::Render(_) | AppError::Internal(_) => {
                // Details stay in the log, never in the response.
                error!("{self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
