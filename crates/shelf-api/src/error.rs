//! Error handling for the Shelf API
//!
//! This module provides structured error types that convert into HTTP
//! responses with proper status codes and a JSON error body. Addressing
//! failures never reach this layer; the resource controller answers those
//! with its own `"out of bound"` body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use shelf_core::ShelfError;
use thiserror::Error;

/// API error type with automatic HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or rejected payloads (400 Bad Request)
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Unknown resource (404 Not Found)
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Persistence backend failures (503 Service Unavailable)
    #[error("Storage error: {message}")]
    StorageError { message: String },

    /// Configuration errors (500 Internal Server Error)
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ApiError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::StorageError { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::StorageError { .. } => "STORAGE_ERROR",
            ApiError::Configuration { .. } => "CONFIGURATION_ERROR",
        }
    }

    /// Convert to ApiErrorResponse format for JSON serialization
    pub fn to_response(&self) -> ApiErrorResponse {
        let details = match self {
            ApiError::Validation { field: Some(field), .. } => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        };

        ApiErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details,
        }
    }
}

/// JSON-serializable error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }
        (status, Json(self.to_response())).into_response()
    }
}

/// Convenience constructors for common error scenarios
impl ApiError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error for a specific field
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }
}

impl From<ShelfError> for ApiError {
    fn from(err: ShelfError) -> Self {
        match err {
            ShelfError::UnknownField { ref field, .. } | ShelfError::FieldType { ref field, .. } => {
                ApiError::validation_field(field.clone(), err.to_string())
            }
            ShelfError::OutOfBounds { .. } | ShelfError::MalformedPosition { .. } => {
                ApiError::validation(err.to_string())
            }
            ShelfError::Storage { message, .. } => ApiError::StorageError { message },
            ShelfError::Configuration { message } => ApiError::Configuration { message },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_from_shelf_error() {
        let err: ApiError = ShelfError::UnknownField {
            table: "UserProfiles".into(),
            field: "Surname".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.to_response();
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert_eq!(body.details, Some(serde_json::json!({"field": "Surname"})));

        let err: ApiError = ShelfError::storage("insert", "database is locked").into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_configuration_errors_are_server_errors() {
        let err: ApiError = ShelfError::configuration("bad schema").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
