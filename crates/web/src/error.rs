//! API error types and JSON error response formatting.
//!
//! `ApiError` gives every JSON endpoint the same error body and maps the
//! workspace's `AppError` onto HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docchat_core::AppError;
use serde::Serialize;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "bad_gateway").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 422 Unprocessable Entity - the question matched no documents.
    UnprocessableEntity(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
    /// 502 Bad Gateway - the answer chain or its model failed.
    BadGateway(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::UnprocessableEntity(_) => "unprocessable_entity",
            ApiError::Internal(_) => "internal_error",
            ApiError::BadGateway(_) => "bad_gateway",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::UnprocessableEntity(msg)
            | ApiError::Internal(msg)
            | ApiError::BadGateway(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.code().to_string(),
            message: self.message().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match &err {
            AppError::Config(_) => ApiError::BadRequest(err.to_string()),
            AppError::NoRelevantDocuments => ApiError::UnprocessableEntity(err.to_string()),
            AppError::Chain(_) | AppError::EmptyChainResult | AppError::Llm(_) => {
                ApiError::BadGateway(err.to_string())
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
