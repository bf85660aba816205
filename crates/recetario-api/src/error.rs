//! Mapping of domain errors onto HTTP responses.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// JSON body of every error response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Name of the violated field, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Present and true when the same request may be retried unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { field: String, message: String },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Storage or other transient failure. The message is logged, not returned.
    #[error("{0}")]
    Unavailable(recetario_core::Error),
    #[error("{0}")]
    Internal(String),
}

impl From<recetario_core::Error> for ApiError {
    fn from(err: recetario_core::Error) -> Self {
        use recetario_core::Error;

        match err {
            Error::Validation { field, reason } => ApiError::Validation {
                message: format!("Invalid {}: {}", field, reason),
                field,
            },
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::RecipeNotFound(id) => ApiError::NotFound(format!("Recipe {} not found", id)),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::Serialization(msg) => ApiError::BadRequest(msg),
            err if err.is_retryable() => ApiError::Unavailable(err),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected malformed path parameter");
        ApiError::Validation {
            field: "recipeId".to_string(),
            message: "Invalid recipeId: must be a valid identifier".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    field: Some(field),
                    retryable: None,
                },
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::message(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorBody::message(msg)),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorBody::message(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::message(msg)),
            ApiError::Unavailable(err) => {
                error!(error = %err, "Storage failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Temporary storage failure, please retry".to_string(),
                        field: None,
                        retryable: Some(true),
                    },
                )
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::message("Internal server error".to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl ErrorBody {
    fn message(error: String) -> Self {
        Self {
            error,
            field: None,
            retryable: None,
        }
    }
}
