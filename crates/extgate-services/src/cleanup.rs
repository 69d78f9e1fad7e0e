//! Policy-driven cleanup of stored files
//!
//! When an extension starts blocking uploads, files already stored under it are
//! removed unless they carry a deletion exception. Cleanup is best effort: each
//! failure is logged and the loop moves on, so the policy change that triggered
//! it is never rolled back.

use async_trait::async_trait;
use extgate_core::extension::normalize_extension;
use extgate_core::models::UploadedFile;
use extgate_core::AppError;
use extgate_db::UploadedFileStore;
use extgate_storage::Storage;
use std::sync::Arc;

use crate::policy::BlockedExtensionHook;

/// Outcome counts of one cleanup pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSummary {
    pub deleted: usize,
    pub protected: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct FileCleanupService {
    files: Arc<dyn UploadedFileStore>,
    storage: Arc<dyn Storage>,
}

impl FileCleanupService {
    pub fn new(files: Arc<dyn UploadedFileStore>, storage: Arc<dyn Storage>) -> Self {
        Self { files, storage }
    }

    /// Delete every ACTIVE file stored under `extension`, skipping protected ones.
    ///
    /// Works on a snapshot taken at the start; uploads arriving meanwhile are
    /// validated against the already-updated policy.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "blocked_extension"))]
    pub async fn delete_files_by_extension(&self, extension: &str) -> CleanupSummary {
        let token = normalize_extension(extension);
        let mut summary = CleanupSummary::default();

        let files = match self.files.find_active_files_by_extension(&token).await {
            Ok(files) => files,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    extension = %token,
                    "Failed to list files for blocked extension"
                );
                return summary;
            }
        };

        for file in files {
            if file.deletion_exception {
                tracing::debug!(
                    file_id = %file.id,
                    filename = %file.original_filename,
                    "Skipping protected file"
                );
                summary.protected += 1;
                continue;
            }

            match self.delete_file(&file).await {
                Ok(()) => summary.deleted += 1,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        file_id = %file.id,
                        filename = %file.original_filename,
                        "Failed to delete file for blocked extension"
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            extension = %token,
            deleted = summary.deleted,
            protected = summary.protected,
            failed = summary.failed,
            "Blocked extension cleanup finished"
        );

        summary
    }

    /// Mark the record deleted, then drop its blob. A record that was already
    /// gone counts as done; a blob that cannot be removed is left orphaned and
    /// logged.
    async fn delete_file(&self, file: &UploadedFile) -> Result<(), AppError> {
        self.files.delete_file(file.id).await?;

        if let Err(e) = self.storage.delete(&file.file_path).await {
            tracing::warn!(
                error = %e,
                file_id = %file.id,
                key = %file.file_path,
                "Record deleted but blob could not be removed"
            );
        }

        Ok(())
    }
}

#[async_trait]
impl BlockedExtensionHook for FileCleanupService {
    async fn on_extension_blocked(&self, extension: &str) {
        self.delete_files_by_extension(extension).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ExtensionPolicyService;
    use crate::test_support::seeded_store;
    use extgate_core::models::{FileStatus, NewUploadedFile};
    use extgate_db::InMemoryUploadedFileStore;
    use extgate_storage::{generate_storage_key, stored_filename, MemoryStorage};
    use uuid::Uuid;

    struct Fixture {
        files: Arc<InMemoryUploadedFileStore>,
        storage: Arc<MemoryStorage>,
        cleanup: Arc<FileCleanupService>,
    }

    fn fixture() -> Fixture {
        let files = Arc::new(InMemoryUploadedFileStore::new());
        let storage = Arc::new(MemoryStorage::new());
        let cleanup = Arc::new(FileCleanupService::new(files.clone(), storage.clone()));
        Fixture {
            files,
            storage,
            cleanup,
        }
    }

    async fn store(fx: &Fixture, name: &str, extension: &str, protected: bool) -> UploadedFile {
        let id = Uuid::new_v4();
        let key = generate_storage_key(id, extension);
        fx.storage
            .upload(&key, "application/octet-stream", b"data".to_vec())
            .await
            .unwrap();
        let file = fx
            .files
            .create_file(NewUploadedFile {
                id,
                original_filename: name.to_string(),
                stored_filename: stored_filename(id, extension),
                file_path: key,
                extension: extension.to_string(),
                file_size: 4,
                content_type: None,
            })
            .await
            .unwrap();
        if protected {
            fx.files.set_deletion_exception(id, true).await.unwrap();
        }
        file
    }

    async fn status(fx: &Fixture, id: Uuid) -> FileStatus {
        fx.files.get_file(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_deletes_unprotected_files_of_extension() {
        let fx = fixture();
        let doomed = store(&fx, "setup.exe", "exe", false).await;
        let kept = store(&fx, "tool.exe", "exe", true).await;
        let other = store(&fx, "notes.txt", "txt", false).await;

        let summary = fx.cleanup.delete_files_by_extension("EXE").await;
        assert_eq!(
            summary,
            CleanupSummary {
                deleted: 1,
                protected: 1,
                failed: 0
            }
        );

        assert_eq!(status(&fx, doomed.id).await, FileStatus::Deleted);
        assert!(!fx.storage.has_file(&doomed.file_path));
        assert_eq!(status(&fx, kept.id).await, FileStatus::Active);
        assert!(fx.storage.has_file(&kept.file_path));
        assert_eq!(status(&fx, other.id).await, FileStatus::Active);
    }

    #[tokio::test]
    async fn test_blob_failure_does_not_stop_cleanup() {
        let fx = fixture();
        let stuck = store(&fx, "a.js", "js", false).await;
        let gone = store(&fx, "b.js", "js", false).await;
        fx.storage.fail_deletes_for(&stuck.file_path);

        let summary = fx.cleanup.delete_files_by_extension("js").await;
        assert_eq!(summary.deleted, 2);
        assert_eq!(status(&fx, stuck.id).await, FileStatus::Deleted);
        assert_eq!(status(&fx, gone.id).await, FileStatus::Deleted);
        assert!(fx.storage.has_file(&stuck.file_path));
        assert!(!fx.storage.has_file(&gone.file_path));
    }

    #[tokio::test]
    async fn test_no_matching_files() {
        let fx = fixture();
        let summary = fx.cleanup.delete_files_by_extension("scr").await;
        assert_eq!(summary, CleanupSummary::default());
    }

    #[tokio::test]
    async fn test_policy_toggle_cascades_into_cleanup() {
        let fx = fixture();
        let doomed = store(&fx, "run.bat", "bat", false).await;
        let protected = store(&fx, "keep.bat", "bat", true).await;

        let policy = ExtensionPolicyService::new(
            seeded_store(&[("bat", false)]).await,
            fx.cleanup.clone(),
        );

        policy.update_fixed_extension("bat", true).await.unwrap();
        assert_eq!(status(&fx, doomed.id).await, FileStatus::Deleted);
        assert_eq!(status(&fx, protected.id).await, FileStatus::Active);

        // Unblocking deletes nothing and restores nothing.
        let later = store(&fx, "later.bat", "bat", false).await;
        policy.update_fixed_extension("bat", false).await.unwrap();
        assert_eq!(status(&fx, later.id).await, FileStatus::Active);
        assert_eq!(status(&fx, doomed.id).await, FileStatus::Deleted);
    }

    #[tokio::test]
    async fn test_custom_add_cascades_into_cleanup() {
        let fx = fixture();
        let doomed = store(&fx, "payload.virus", "virus", false).await;

        let policy =
            ExtensionPolicyService::new(seeded_store(&[("exe", true)]).await, fx.cleanup.clone());
        policy.add_custom_extension("virus").await.unwrap();

        assert_eq!(status(&fx, doomed.id).await, FileStatus::Deleted);
    }
}
