//! Error types for the chat orchestration service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for orchestration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Chat orchestration errors
///
/// The first five variants are the client-visible taxonomy; `Config` and
/// `Internal` cover startup and bug-class failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or unsafe client input. Never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed query rejected by the search backend
    #[error("Query error: {0}")]
    QueryError(String),

    /// Transient transport/connectivity failure toward a backend
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend reachable but returned a malformed or inconsistent result
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Caller tore the request down before it completed
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a backend-unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::BackendUnavailable(message.into())
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendError(message.into())
    }

    /// Create a cancellation error
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for transport failures that the retrieval layer may retry once
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::BackendUnavailable(_))
    }

    /// Stable machine-readable kind for stream error fragments and JSON bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "invalid_argument",
            Error::NotFound(_) => "not_found",
            Error::QueryError(_) => "query_error",
            Error::BackendUnavailable(_) => "backend_unavailable",
            Error::BackendError(_) => "backend_error",
            Error::Cancelled(_) => "cancelled",
            Error::Config(_) => "config_error",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Connectivity problems are transient; a reachable backend that sent
        // garbage (decode failures, bad status bodies) is not.
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Error::BackendUnavailable(err.to_string())
        } else {
            Error::BackendError(err.to_string())
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::QueryError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::BackendError(_) => StatusCode::BAD_GATEWAY,
            // 499: client closed the request
            Error::Cancelled(_) => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(Error::unavailable("conn refused").is_transient());
        assert!(!Error::backend("bad payload").is_transient());
        assert!(!Error::invalid_argument("empty query").is_transient());
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(Error::QueryError("x".into()).kind(), "query_error");
        assert_eq!(Error::not_found("y").kind(), "not_found");
        assert_eq!(Error::cancelled("client gone").kind(), "cancelled");
    }

    #[test]
    fn cancellation_is_not_transient() {
        assert!(!Error::cancelled("client gone").is_transient());
    }
}
