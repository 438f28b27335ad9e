//! Typed error handling for list queries
//!
//! Translating query parameters never fails. The errors here come from the
//! two places that can: building a [`ListQueryConfig`] (caught once, when the
//! endpoint is defined) and running queries against a data store.
//!
//! # Error Categories
//!
//! - [`ConfigError`]: invalid list configuration or descriptor files
//! - [`ListQueryError::Storage`]: a data-store failure, passed through untouched
//!
//! [`ListQueryConfig`]: crate::core::list_config::ListQueryConfig

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// The main error type for list endpoints
#[derive(Debug, thiserror::Error)]
pub enum ListQueryError {
    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Data store errors, as returned by the store
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ListQueryError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ListQueryError::Config(e) => e.error_code(),
            ListQueryError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for ListQueryError {
    fn into_response(self) -> Response {
        tracing::error!(code = self.error_code(), error = %self, "list query failed");
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to list configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The default sort key has no sortable column
    #[error("Default sort key '{key}' is not declared as sortable")]
    UnknownDefaultSort { key: String },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Failed to parse a descriptor file
    #[error("Failed to parse config{}: {message}", file_suffix(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// No endpoint with this name in the loaded descriptors
    #[error("List endpoint '{name}' is not configured")]
    UnknownEndpoint { name: String },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_deref()
        .map(|f| format!(" file '{f}'"))
        .unwrap_or_default()
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::UnknownDefaultSort { .. } => "UNKNOWN_DEFAULT_SORT",
            ConfigError::InvalidValue { .. } => "INVALID_CONFIG_VALUE",
            ConfigError::ParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::UnknownEndpoint { .. } => "UNKNOWN_ENDPOINT",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }
}
