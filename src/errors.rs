//! Structured error handling for the dashboard API
//!
//! Every failure surfaced to a client carries a machine-readable code and a
//! status class: configuration problems are 400s detected before any upstream
//! call, upstream failures are 500s that abort the whole aggregation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured error response for API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

/// Application error types with proper categorization
#[derive(Debug)]
pub enum AppError {
    // Client errors (400) - detected before any upstream call, never retried
    InvalidInput { field: String, reason: String },
    QueryRequired,
    MissingCredential { var: &'static str },

    // Upstream failures (500) - first failure aborts the whole aggregation
    StoreError(String),
    TelemetryError(String),
    EmbeddingError(String),

    // Generic wrapper for external errors
    Internal(anyhow::Error),
}

impl AppError {
    /// Wrap a backing-store failure
    pub fn store(err: anyhow::Error) -> Self {
        Self::StoreError(err.to_string())
    }

    /// Wrap a telemetry-fetch failure
    pub fn telemetry(err: anyhow::Error) -> Self {
        Self::TelemetryError(err.to_string())
    }

    /// Wrap an embedding-call failure
    pub fn embedding(err: anyhow::Error) -> Self {
        Self::EmbeddingError(err.to_string())
    }

    /// Get error code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::QueryRequired => "QUERY_REQUIRED",
            Self::MissingCredential { .. } => "MISSING_CREDENTIAL",
            Self::StoreError(_) => "STORE_ERROR",
            Self::TelemetryError(_) => "TELEMETRY_ERROR",
            Self::EmbeddingError(_) => "EMBEDDING_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } | Self::QueryRequired | Self::MissingCredential { .. } => {
                StatusCode::BAD_REQUEST
            }

            Self::StoreError(_)
            | Self::TelemetryError(_)
            | Self::EmbeddingError(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get detailed error message
    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput { field, reason } => {
                format!("Invalid input for field '{field}': {reason}")
            }
            Self::QueryRequired => "Query is required".to_string(),
            Self::MissingCredential { var } => {
                format!("Query Explorer requires an OpenAI API key. Set {var} in the environment")
            }
            Self::StoreError(msg) => format!("Vector store request failed: {msg}"),
            Self::TelemetryError(msg) => format!("Telemetry fetch failed: {msg}"),
            Self::EmbeddingError(msg) => format!("Embedding request failed: {msg}"),
            Self::Internal(err) => format!("Internal error: {err}"),
        }
    }

    /// Convert to structured error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.message(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

/// Convert from anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Axum IntoResponse implementation for proper HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_response();

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[self.code()])
            .inc();

        (status, Json(body)).into_response()
    }
}

/// Type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::QueryRequired.code(), "QUERY_REQUIRED");
        assert_eq!(
            AppError::MissingCredential {
                var: "OPENAI_API_KEY"
            }
            .code(),
            "MISSING_CREDENTIAL"
        );
        assert_eq!(
            AppError::StoreError("timeout".to_string()).code(),
            "STORE_ERROR"
        );
    }

    #[test]
    fn test_status_classes() {
        // Configuration problems are client errors
        assert_eq!(
            AppError::QueryRequired.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MissingCredential {
                var: "OPENAI_API_KEY"
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );

        // Upstream failures are server errors
        assert_eq!(
            AppError::StoreError("failed".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::TelemetryError("failed".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_credential_message_names_the_variable() {
        let err = AppError::MissingCredential {
            var: "OPENAI_API_KEY",
        };
        assert!(err.message().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_error_response_serialization() {
        let err = AppError::QueryRequired;
        let response = err.to_response();

        assert_eq!(response.code, "QUERY_REQUIRED");
        assert!(response.message.to_lowercase().contains("required"));
    }
}
