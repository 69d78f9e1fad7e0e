//! Store trait abstractions
//!
//! The services depend on these traits rather than on concrete repositories so
//! policy state can live in Postgres or in memory, and tests can run without a
//! database.

use async_trait::async_trait;
use extgate_core::models::{
    AuditLogEntry, CustomExtension, FileStatus, FixedExtensionSetting, NewAuditLogEntry,
    NewUploadedFile, UploadedFile,
};
use extgate_core::AppError;
use uuid::Uuid;

/// Fixed-extension settings and custom extensions.
///
/// Tokens passed in are expected to be normalized already. Uniqueness of both
/// sets is enforced by the store: a duplicate custom insert fails with
/// `AppError::AlreadyExists` even when two requests race past the service check.
#[async_trait]
pub trait ExtensionPolicyStore: Send + Sync {
    async fn find_fixed_extension(
        &self,
        extension: &str,
    ) -> Result<Option<FixedExtensionSetting>, AppError>;

    /// All fixed settings in creation order (stable across calls).
    async fn list_fixed_extensions(&self) -> Result<Vec<FixedExtensionSetting>, AppError>;

    /// Persist a new block flag. Returns `None` when the extension is not part
    /// of the fixed vocabulary.
    async fn save_fixed_setting(
        &self,
        extension: &str,
        is_blocked: bool,
    ) -> Result<Option<FixedExtensionSetting>, AppError>;

    /// Insert the given `(extension, blocked)` rows that do not exist yet.
    /// Existing rows keep their current flag. Returns the number inserted.
    async fn seed_fixed_extensions(&self, defaults: &[(String, bool)]) -> Result<u64, AppError>;

    async fn find_custom_extension(
        &self,
        extension: &str,
    ) -> Result<Option<CustomExtension>, AppError>;

    async fn find_custom_extension_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<CustomExtension>, AppError>;

    /// All custom extensions in creation order (stable across calls).
    async fn list_custom_extensions(&self) -> Result<Vec<CustomExtension>, AppError>;

    async fn count_custom_extensions(&self) -> Result<i64, AppError>;

    async fn save_custom_extension(&self, extension: &str) -> Result<CustomExtension, AppError>;

    /// Returns whether a row was removed.
    async fn delete_custom_extension(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Uploaded-file metadata.
#[async_trait]
pub trait UploadedFileStore: Send + Sync {
    async fn create_file(&self, file: NewUploadedFile) -> Result<UploadedFile, AppError>;

    async fn get_file(&self, id: Uuid) -> Result<Option<UploadedFile>, AppError>;

    /// Files newest first, optionally filtered by status.
    async fn list_files(&self, status: Option<FileStatus>) -> Result<Vec<UploadedFile>, AppError>;

    /// Files of any status recorded under `extension`, newest first.
    async fn list_files_by_extension(
        &self,
        extension: &str,
    ) -> Result<Vec<UploadedFile>, AppError>;

    /// ACTIVE files recorded under `extension`, newest first.
    async fn find_active_files_by_extension(
        &self,
        extension: &str,
    ) -> Result<Vec<UploadedFile>, AppError>;

    /// Soft delete: moves an ACTIVE file to DELETED. Returns whether a row changed.
    async fn delete_file(&self, id: Uuid) -> Result<bool, AppError>;

    async fn set_deletion_exception(
        &self,
        id: Uuid,
        deletion_exception: bool,
    ) -> Result<Option<UploadedFile>, AppError>;
}

/// Audit trail of upload decisions.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    async fn record(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, AppError>;

    /// Entries newest first.
    async fn list_entries(&self, limit: i64, offset: i64) -> Result<Vec<AuditLogEntry>, AppError>;

    /// Blocked entries newest first.
    async fn list_blocked_entries(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntry>, AppError>;
}
