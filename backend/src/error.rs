//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to enveloped HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use meal_tracker_shared::{ApiResponse, MealError};
use thiserror::Error;
use tracing::error;

/// Message shown to clients for every 500 response
pub const INTERNAL_MESSAGE: &str = "Something went wrong!";

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// A named operation failed without a storage error to show for it
    #[error("{0}")]
    OperationFailed(String),

    /// Storage or plumbing failure; `sqlx` errors are reported as database errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<MealError> for ApiError {
    fn from(err: MealError) -> Self {
        match err {
            MealError::Validation(msg) => ApiError::Validation(msg),
            MealError::NotFound(msg) => ApiError::NotFound(msg),
            MealError::Internal(msg) => ApiError::OperationFailed(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::OperationFailed(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ApiError::Validation(msg) | ApiError::NotFound(msg) | ApiError::BadRequest(msg) => {
                ApiResponse::failure(msg.clone(), msg.clone())
            }
            ApiError::OperationFailed(msg) => {
                error!("Operation failed: {}", msg);
                ApiResponse::failure(msg.clone(), INTERNAL_MESSAGE)
            }
            ApiError::Internal(err) if err.downcast_ref::<sqlx::Error>().is_some() => {
                error!("Database error: {:?}", err);
                ApiResponse::failure("A database error occurred", INTERNAL_MESSAGE)
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                ApiResponse::failure("Internal server error", INTERNAL_MESSAGE)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
