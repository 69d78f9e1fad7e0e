//! Error types module
//!
//! This module provides the core error types used throughout extgate.
//! All errors are unified under the `AppError` enum which can represent database,
//! storage, input validation, and extension-policy administration errors.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Upload exceeds the configured size ceiling.
    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A custom extension collides with a fixed extension.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Limit exceeded: {resource} {used}/{limit}")]
    LimitExceeded {
        resource: String,
        used: i64,
        limit: i64,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            400,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and upload again"),
            false,
            LogLevel::Debug,
        ),
        AppError::AlreadyExists(_) => (
            400,
            "ALREADY_EXISTS",
            false,
            Some("The extension is already registered"),
            false,
            LogLevel::Debug,
        ),
        AppError::Conflict(_) => (
            400,
            "EXTENSION_CONFLICT",
            false,
            Some("Toggle the fixed extension instead of adding it as custom"),
            false,
            LogLevel::Debug,
        ),
        AppError::LimitExceeded { .. } => (
            400,
            "LIMIT_EXCEEDED",
            false,
            Some("Delete unused custom extensions before adding new ones"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::AlreadyExists(_) => "AlreadyExists",
            AppError::Conflict(_) => "Conflict",
            AppError::LimitExceeded { .. } => "LimitExceeded",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::AlreadyExists(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::LimitExceeded {
                resource, limit, ..
            } => format!("At most {} {} can be registered", limit, resource),
            AppError::Internal(_) => "An internal error occurred".to_string(),
            AppError::InternalWithSource { .. } => "An internal error occurred".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_errors_are_client_errors() {
        let errors = [
            AppError::AlreadyExists("sh".to_string()),
            AppError::Conflict("exe".to_string()),
            AppError::LimitExceeded {
                resource: "custom extensions".to_string(),
                used: 200,
                limit: 200,
            },
            AppError::InvalidInput("empty file".to_string()),
        ];

        for err in errors {
            assert_eq!(err.http_status_code(), 400, "{}", err);
            assert!(!err.is_recoverable());
            assert!(!err.is_sensitive());
        }
    }

    #[test]
    fn test_size_and_not_found_codes() {
        let too_big = AppError::PayloadTooLarge("too big".into());
        assert_eq!(too_big.http_status_code(), 400);
        assert_eq!(too_big.error_code(), "PAYLOAD_TOO_LARGE");
        assert_eq!(AppError::NotFound("x".into()).http_status_code(), 404);
        assert_eq!(AppError::NotFound("x".into()).error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::Internal("connection refused at 10.0.0.3".to_string());
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "An internal error occurred");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_limit_exceeded_message() {
        let err = AppError::LimitExceeded {
            resource: "custom extensions".to_string(),
            used: 200,
            limit: 200,
        };
        assert_eq!(err.to_string(), "Limit exceeded: custom extensions 200/200");
        assert_eq!(
            err.client_message(),
            "At most 200 custom extensions can be registered"
        );
        assert_eq!(err.error_type(), "LimitExceeded");
    }

    #[test]
    fn test_detailed_message_includes_source() {
        let err: AppError = anyhow::anyhow!("disk unavailable").into();
        assert!(err.detailed_message().starts_with("Internal error with source"));
        assert!(err.detailed_message().contains("disk unavailable"));
    }
}
