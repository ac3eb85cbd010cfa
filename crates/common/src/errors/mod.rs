//! Error types for AcademicWorld services
//!
//! Provides an error handling system with:
//! - Distinct error types for validation, not-found, and store faults
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,
    InvalidFormat,

    // Session errors (2xxx)
    MissingSession,

    // Resource errors (4xxx)
    KeywordNotFound,

    // Rate limiting (6xxx)
    RateLimited,

    // Relational store errors (7xxx)
    DatabaseError,
    ConnectionError,
    TransactionError,

    // Graph and document store errors (8xxx)
    GraphError,
    FavoritesError,

    // Internal errors (9xxx)
    ConfigurationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::InvalidFormat => 1003,

            ErrorCode::MissingSession => 2001,

            ErrorCode::KeywordNotFound => 4002,

            ErrorCode::RateLimited => 6001,

            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,
            ErrorCode::TransactionError => 7003,

            ErrorCode::GraphError => 8001,
            ErrorCode::FavoritesError => 8002,

            ErrorCode::ConfigurationError => 9002,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Missing or blank X-Session-ID header")]
    MissingSession,

    // Resource errors
    #[error("Keyword '{keyword}' does not exist in the database.")]
    KeywordNotFound { keyword: String },

    // Rate limiting
    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    // Relational store errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    #[error("Query failed: {message}")]
    TransactionFailed { message: String },

    // Graph store errors
    #[error("Graph query failed: {message}")]
    Graph { message: String },

    // Document store errors
    #[error("Favorites store error: {message}")]
    Favorites { message: String },

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::MissingSession => ErrorCode::MissingSession,
            AppError::KeywordNotFound { .. } => ErrorCode::KeywordNotFound,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::TransactionFailed { .. } => ErrorCode::TransactionError,
            AppError::Graph { .. } => ErrorCode::GraphError,
            AppError::Favorites { .. } => ErrorCode::FavoritesError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidFormat { .. }
            | AppError::MissingSession => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::KeywordNotFound { .. } => StatusCode::NOT_FOUND,

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::TransactionFailed { .. }
            | AppError::Graph { .. }
            | AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            // 503 Service Unavailable
            AppError::Favorites { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Shorthand for a validation failure on a named field
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let field = match self {
            AppError::Validation { field, .. } => field,
            AppError::MissingField { field } => Some(field),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidFormat {
            message: rejection.body_text(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseConnection {
            message: err.to_string(),
        }
    }
}

impl From<neo4rs::Error> for AppError {
    fn from(err: neo4rs::Error) -> Self {
        AppError::Graph {
            message: err.to_string(),
        }
    }
}

impl From<neo4rs::DeError> for AppError {
    fn from(err: neo4rs::DeError) -> Self {
        AppError::Graph {
            message: format!("unexpected row shape: {}", err),
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Favorites {
            message: err.to_string(),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Favorites {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_not_found_mapping() {
        let err = AppError::KeywordNotFound {
            keyword: "zzz-nonexistent".into(),
        };
        assert_eq!(err.code(), ErrorCode::KeywordNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.to_string(),
            "Keyword 'zzz-nonexistent' does not exist in the database."
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::validation("keyword", "Please enter a keyword.");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_server_error());
        assert!(err.is_client_error());
    }

    #[test]
    fn test_store_faults_are_server_errors() {
        let txn = AppError::TransactionFailed {
            message: "lock wait timeout".into(),
        };
        assert_eq!(txn.code().as_code(), 7003);
        assert!(txn.is_server_error());
        assert!(txn.to_string().starts_with("Query failed"));

        let graph = AppError::Graph {
            message: "connection refused".into(),
        };
        assert_eq!(graph.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let favorites = AppError::Favorites {
            message: "broken pipe".into(),
        };
        assert_eq!(favorites.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_missing_session_is_bad_request() {
        assert_eq!(AppError::MissingSession.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MissingSession.code(), ErrorCode::MissingSession);
    }
}
