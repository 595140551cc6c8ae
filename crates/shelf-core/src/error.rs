//! Error handling for Shelf core operations
//!
//! Stores and backends report failures through [`ShelfError`]. The resource
//! controller recovers the addressing errors locally; everything else is
//! propagated to the transport layer.

use thiserror::Error;

/// Error type for store, backend and controller operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShelfError {
    /// Position outside `[0, len)`
    #[error("Position {position} out of bounds for collection of length {len}")]
    OutOfBounds { position: i64, len: usize },

    /// Position token that is not an integer
    #[error("Malformed position: {token:?}")]
    MalformedPosition { token: String },

    /// Record field not declared by the table schema
    #[error("Unknown field '{field}' for table {table}")]
    UnknownField { table: String, field: String },

    /// Record field whose value does not fit the column type
    #[error("Field '{field}' of table {table} expects {expected}, got {actual}")]
    FieldType { table: String, field: String, expected: &'static str, actual: &'static str },

    /// Persistence backend failure
    #[error("Storage error: {message}")]
    Storage { message: String, operation: Option<String> },

    /// Invalid backend or resource configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ShelfError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ShelfError::OutOfBounds { .. } => "out_of_bounds",
            ShelfError::MalformedPosition { .. } => "malformed_position",
            ShelfError::UnknownField { .. } => "unknown_field",
            ShelfError::FieldType { .. } => "field_type",
            ShelfError::Storage { .. } => "storage",
            ShelfError::Configuration { .. } => "configuration",
        }
    }

    /// Whether this error is a failure to address a record, which callers
    /// report as "out of bound"
    pub fn is_addressing(&self) -> bool {
        matches!(self, ShelfError::OutOfBounds { .. } | ShelfError::MalformedPosition { .. })
    }

    /// Whether this error rejects the submitted record itself
    pub fn is_invalid_record(&self) -> bool {
        matches!(self, ShelfError::UnknownField { .. } | ShelfError::FieldType { .. })
    }
}

/// Result type alias for core operations
pub type ShelfResult<T> = Result<T, ShelfError>;

/// Convenience constructors for common error scenarios
impl ShelfError {
    /// Create an out-of-bounds error
    pub fn out_of_bounds(position: i64, len: usize) -> Self {
        Self::OutOfBounds { position, len }
    }

    /// Create a malformed position error
    pub fn malformed_position(token: impl Into<String>) -> Self {
        Self::MalformedPosition { token: token.into() }
    }

    /// Create a storage error tagged with the failing operation
    pub fn storage(operation: &str, message: impl Into<String>) -> Self {
        Self::Storage { message: message.into(), operation: Some(operation.to_string()) }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}

impl From<sqlx::Error> for ShelfError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage { message: err.to_string(), operation: None }
    }
}
