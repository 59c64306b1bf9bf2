//! services/api/src/error.rs
//!
//! Defines the primary error types for the API service: `ApiError` for
//! startup-level failures and `RequestError` for per-request failures that
//! map onto HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use news_core::ports::PortError;
use serde_json::json;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The per-request error taxonomy. Every protected handler returns this so
/// the status-code mapping lives in exactly one place.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Missing, invalid, or expired session credential.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Login failed. Deliberately does not say which of email/password was
    /// wrong.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// A uniqueness rule was violated (duplicate registration email).
    #[error("{0}")]
    Conflict(String),

    /// Malformed identifier or form input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The referenced user or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required field failed validation; re-renderable inline by the UI.
    #[error("validation: {0}")]
    Validation(String),

    /// The news or summarization provider failed the primary request.
    #[error("upstream: {0}")]
    Upstream(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl RequestError {
    fn status(&self) -> StatusCode {
        match self {
            RequestError::Unauthenticated | RequestError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            RequestError::Conflict(_) => StatusCode::CONFLICT,
            RequestError::BadRequest(_) | RequestError::Validation(_) => StatusCode::BAD_REQUEST,
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RequestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let message = match &self {
            RequestError::Unauthenticated => "authentication required".to_string(),
            other => other.to_string(),
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

impl From<PortError> for RequestError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(msg) => RequestError::NotFound(msg),
            PortError::Conflict(msg) => RequestError::Conflict(msg),
            PortError::Upstream(msg) => RequestError::Upstream(msg),
            PortError::Unexpected(msg) => RequestError::Internal(msg),
        }
    }
}
