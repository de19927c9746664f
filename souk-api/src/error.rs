//! API Error Types
//!
//! Error surface of the HTTP layer. Core errors carry their own taxonomy
//! (`MarketError`); this module maps each kind to a transport status and a
//! stable error code the client can branch on.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use souk_core::MarketError;
use thiserror::Error;

/// API-specific errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Validation error
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    /// Missing or invalid credentials
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// Core error
    #[error("{0}")]
    Market(#[from] MarketError),

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: String,
    /// Error message
    pub message: String,
    /// Optional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Market(err) => match err {
                MarketError::NotFound { .. } => StatusCode::NOT_FOUND,
                MarketError::Forbidden { .. } => StatusCode::FORBIDDEN,
                MarketError::InvalidState { .. } => StatusCode::BAD_REQUEST,
                MarketError::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
                MarketError::Inconsistency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                MarketError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Market(err) => match err {
                MarketError::NotFound { .. } => "NOT_FOUND",
                MarketError::Forbidden { .. } => "FORBIDDEN",
                MarketError::InvalidState { .. } => "INVALID_STATE",
                MarketError::InvalidAmount { .. } => "INVALID_AMOUNT",
                MarketError::Inconsistency { .. } => "REFERRAL_INCONSISTENCY",
                MarketError::Unavailable { .. } => "STORE_UNAVAILABLE",
            },
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: None,
        };

        (status, Json(error_response)).into_response()
    }
}
