//! Database repositories for data access layer
//!
//! Postgres implementations of the store traits. Each repository owns a
//! `PgPool` clone and maps rows into core models.

pub mod audit;
pub mod extension;
pub mod uploaded_file;

pub use audit::AuditLogRepository;
pub use extension::ExtensionRepository;
pub use uploaded_file::UploadedFileRepository;

use extgate_core::AppError;

/// Translate a unique-constraint violation into `AlreadyExists`; anything
/// else stays a database error.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return AppError::AlreadyExists(message());
        }
    }
    AppError::Database(err)
}
