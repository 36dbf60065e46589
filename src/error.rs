//! Error types for a3s-users

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Message returned to clients for any unexpected failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

/// Errors produced by the record store and request handlers
///
/// Every variant maps to a single HTTP status and a `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum UserError {
    /// Missing or malformed client input
    #[error("{0}")]
    Validation(String),

    /// No record with the requested id
    #[error("User not found")]
    NotFound,

    /// Anything else; the detail is logged and never sent to the client
    #[error("Internal error: {0}")]
    Internal(String),
}

impl UserError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            UserError::Validation(_) => StatusCode::BAD_REQUEST,
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            UserError::Internal(detail) => {
                tracing::error!(error = %detail, "Unhandled error in request handler");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Errors from the message bus side channel
///
/// These are logged and swallowed by the adapter; they never reach a client.
#[derive(Debug, Error)]
pub enum EventError {
    /// Bus connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Publish failure
    #[error("Failed to publish event to subject '{subject}': {reason}")]
    Publish { subject: String, reason: String },

    /// Serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The adapter or provider has already been closed
    #[error("Publisher is closed")]
    Closed,
}

/// Errors from starting or running the HTTP server
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for store and handler operations
pub type Result<T> = std::result::Result<T, UserError>;

/// Result type alias for bus operations
pub type EventResult<T> = std::result::Result<T, EventError>;
