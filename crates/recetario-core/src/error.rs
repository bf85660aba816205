//! Error types for recetario.

use thiserror::Error;

/// Result type alias using recetario's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for recetario operations.
///
/// Every variant is a typed outcome: the serving layer maps variants to
/// statuses and never needs to inspect message text.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Recipe not found
    #[error("Recipe not found: {0}")]
    RecipeNotFound(uuid::Uuid),

    /// A request field violated a constraint
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Authentication failed or no caller identity was supplied
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not allowed)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a validation error for `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller may retry the same request unchanged.
    ///
    /// Storage failures are transient; every domain rejection is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Internal(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
