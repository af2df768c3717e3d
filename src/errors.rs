use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::repo_types::Role;

/// Errors surfaced by the services and mapped to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid price")]
    InvalidPrice,

    #[error("Invalid status")]
    InvalidStatus,

    #[error("{0} is required")]
    MissingFile(&'static str),

    #[error("{0}")]
    Upload(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Please login as {0}")]
    RoleMismatch(Role),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Seller not found")]
    SellerNotFound,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn missing_field(name: &str) -> Self {
        AppError::Validation(format!("Missing field: {name}"))
    }

    pub fn admin_required() -> Self {
        AppError::Unauthorized("Admin authorization required".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::InvalidPrice
            | AppError::InvalidStatus
            | AppError::MissingFile(_)
            | AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::RoleMismatch(_) => StatusCode::FORBIDDEN,
            AppError::SellerNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Multipart(e) => e.status(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
