//! In-memory store implementations
//!
//! Back `STORE_BACKEND=memory` and the service and HTTP test suites. They keep
//! the same uniqueness and ordering guarantees as the Postgres repositories.

use async_trait::async_trait;
use chrono::Utc;
use extgate_core::models::{
    AuditLogEntry, CustomExtension, FileStatus, FixedExtensionSetting, NewAuditLogEntry,
    NewUploadedFile, UploadedFile,
};
use extgate_core::AppError;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::traits::{AuditLogStore, ExtensionPolicyStore, UploadedFileStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn page<T: Clone>(items: impl Iterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[derive(Default)]
struct ExtensionTables {
    fixed: Vec<FixedExtensionSetting>,
    custom: Vec<CustomExtension>,
}

/// Fixed and custom extensions kept in insertion order.
#[derive(Default)]
pub struct InMemoryExtensionStore {
    tables: Mutex<ExtensionTables>,
}

impl InMemoryExtensionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExtensionPolicyStore for InMemoryExtensionStore {
    async fn find_fixed_extension(
        &self,
        extension: &str,
    ) -> Result<Option<FixedExtensionSetting>, AppError> {
        Ok(lock(&self.tables)
            .fixed
            .iter()
            .find(|s| s.extension == extension)
            .cloned())
    }

    async fn list_fixed_extensions(&self) -> Result<Vec<FixedExtensionSetting>, AppError> {
        Ok(lock(&self.tables).fixed.clone())
    }

    async fn save_fixed_setting(
        &self,
        extension: &str,
        is_blocked: bool,
    ) -> Result<Option<FixedExtensionSetting>, AppError> {
        let mut tables = lock(&self.tables);
        Ok(tables
            .fixed
            .iter_mut()
            .find(|s| s.extension == extension)
            .map(|setting| {
                setting.is_blocked = is_blocked;
                setting.updated_at = Utc::now();
                setting.clone()
            }))
    }

    async fn seed_fixed_extensions(&self, defaults: &[(String, bool)]) -> Result<u64, AppError> {
        let mut tables = lock(&self.tables);
        let mut inserted = 0;
        for (extension, is_blocked) in defaults {
            if tables.fixed.iter().any(|s| &s.extension == extension) {
                continue;
            }
            let now = Utc::now();
            tables.fixed.push(FixedExtensionSetting {
                id: Uuid::new_v4(),
                extension: extension.clone(),
                is_blocked: *is_blocked,
                created_at: now,
                updated_at: now,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn find_custom_extension(
        &self,
        extension: &str,
    ) -> Result<Option<CustomExtension>, AppError> {
        Ok(lock(&self.tables)
            .custom
            .iter()
            .find(|c| c.extension == extension)
            .cloned())
    }

    async fn find_custom_extension_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<CustomExtension>, AppError> {
        Ok(lock(&self.tables)
            .custom
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list_custom_extensions(&self) -> Result<Vec<CustomExtension>, AppError> {
        Ok(lock(&self.tables).custom.clone())
    }

    async fn count_custom_extensions(&self) -> Result<i64, AppError> {
        Ok(lock(&self.tables).custom.len() as i64)
    }

    async fn save_custom_extension(&self, extension: &str) -> Result<CustomExtension, AppError> {
        let mut tables = lock(&self.tables);
        if tables.custom.iter().any(|c| c.extension == extension) {
            return Err(AppError::AlreadyExists(format!(
                "Custom extension '{}' already exists",
                extension
            )));
        }
        let entry = CustomExtension {
            id: Uuid::new_v4(),
            extension: extension.to_string(),
            created_at: Utc::now(),
        };
        tables.custom.push(entry.clone());
        Ok(entry)
    }

    async fn delete_custom_extension(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = lock(&self.tables);
        let before = tables.custom.len();
        tables.custom.retain(|c| c.id != id);
        Ok(tables.custom.len() != before)
    }
}

/// Uploaded-file metadata kept in insertion order.
#[derive(Default)]
pub struct InMemoryUploadedFileStore {
    files: Mutex<Vec<UploadedFile>>,
}

impl InMemoryUploadedFileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UploadedFileStore for InMemoryUploadedFileStore {
    async fn create_file(&self, file: NewUploadedFile) -> Result<UploadedFile, AppError> {
        let mut files = lock(&self.files);
        if files.iter().any(|f| f.id == file.id) {
            return Err(AppError::AlreadyExists(format!(
                "Uploaded file {} already exists",
                file.id
            )));
        }
        let now = Utc::now();
        let record = UploadedFile {
            id: file.id,
            original_filename: file.original_filename,
            stored_filename: file.stored_filename,
            file_path: file.file_path,
            extension: file.extension,
            file_size: file.file_size,
            content_type: file.content_type,
            status: FileStatus::Active,
            deletion_exception: false,
            created_at: now,
            updated_at: now,
        };
        files.push(record.clone());
        Ok(record)
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<UploadedFile>, AppError> {
        Ok(lock(&self.files).iter().find(|f| f.id == id).cloned())
    }

    async fn list_files(&self, status: Option<FileStatus>) -> Result<Vec<UploadedFile>, AppError> {
        Ok(lock(&self.files)
            .iter()
            .rev()
            .filter(|f| status.map_or(true, |s| f.status == s))
            .cloned()
            .collect())
    }

    async fn list_files_by_extension(
        &self,
        extension: &str,
    ) -> Result<Vec<UploadedFile>, AppError> {
        Ok(lock(&self.files)
            .iter()
            .rev()
            .filter(|f| f.extension == extension)
            .cloned()
            .collect())
    }

    async fn find_active_files_by_extension(
        &self,
        extension: &str,
    ) -> Result<Vec<UploadedFile>, AppError> {
        Ok(lock(&self.files)
            .iter()
            .rev()
            .filter(|f| f.is_active() && f.extension == extension)
            .cloned()
            .collect())
    }

    async fn delete_file(&self, id: Uuid) -> Result<bool, AppError> {
        let mut files = lock(&self.files);
        match files.iter_mut().find(|f| f.id == id && f.is_active()) {
            Some(file) => {
                file.status = FileStatus::Deleted;
                file.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_deletion_exception(
        &self,
        id: Uuid,
        deletion_exception: bool,
    ) -> Result<Option<UploadedFile>, AppError> {
        let mut files = lock(&self.files);
        Ok(files.iter_mut().find(|f| f.id == id).map(|file| {
            file.deletion_exception = deletion_exception;
            file.updated_at = Utc::now();
            file.clone()
        }))
    }
}

/// Audit entries kept in insertion order.
#[derive(Default)]
pub struct InMemoryAuditLogStore {
    entries: Mutex<Vec<AuditLogEntry>>,
}

impl InMemoryAuditLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLogStore for InMemoryAuditLogStore {
    async fn record(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, AppError> {
        let record = AuditLogEntry {
            id: Uuid::new_v4(),
            filename: entry.filename,
            file_size: entry.file_size,
            blocked: entry.blocked,
            block_reason: entry.block_reason,
            block_reason_kind: entry.block_reason_kind,
            blocked_extension: entry.blocked_extension,
            client_ip: entry.client_ip,
            user_agent: entry.user_agent,
            created_at: Utc::now(),
        };
        lock(&self.entries).push(record.clone());
        Ok(record)
    }

    async fn list_entries(&self, limit: i64, offset: i64) -> Result<Vec<AuditLogEntry>, AppError> {
        let entries = lock(&self.entries);
        Ok(page(entries.iter().rev().cloned(), limit, offset))
    }

    async fn list_blocked_entries(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntry>, AppError> {
        let entries = lock(&self.entries);
        Ok(page(
            entries.iter().rev().filter(|e| e.blocked).cloned(),
            limit,
            offset,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_file(extension: &str) -> NewUploadedFile {
        let id = Uuid::new_v4();
        NewUploadedFile {
            id,
            original_filename: format!("report.{}", extension),
            stored_filename: format!("{}.{}", id, extension),
            file_path: format!("uploads/{}.{}", id, extension),
            extension: extension.to_string(),
            file_size: 42,
            content_type: Some("application/octet-stream".to_string()),
        }
    }

    #[tokio::test]
    async fn test_seed_is_insert_if_absent() {
        let store = InMemoryExtensionStore::new();
        let seed = vec![("exe".to_string(), true), ("bat".to_string(), false)];

        assert_eq!(store.seed_fixed_extensions(&seed).await.unwrap(), 2);
        store.save_fixed_setting("bat", true).await.unwrap();

        // Re-seeding keeps the toggled flag.
        assert_eq!(store.seed_fixed_extensions(&seed).await.unwrap(), 0);
        let bat = store.find_fixed_extension("bat").await.unwrap().unwrap();
        assert!(bat.is_blocked);

        let listed: Vec<String> = store
            .list_fixed_extensions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.extension)
            .collect();
        assert_eq!(listed, vec!["exe", "bat"]);
    }

    #[tokio::test]
    async fn test_save_fixed_setting_unknown_extension() {
        let store = InMemoryExtensionStore::new();
        assert!(store.save_fixed_setting("sh", true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_custom_uniqueness_enforced_by_store() {
        let store = InMemoryExtensionStore::new();
        store.save_custom_extension("sh").await.unwrap();

        let err = store.save_custom_extension("sh").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
        assert_eq!(store.count_custom_extensions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_custom_extension() {
        let store = InMemoryExtensionStore::new();
        let entry = store.save_custom_extension("virus").await.unwrap();

        assert!(store.delete_custom_extension(entry.id).await.unwrap());
        assert!(!store.delete_custom_extension(entry.id).await.unwrap());
        assert!(store.find_custom_extension("virus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_soft_delete_and_listing() {
        let store = InMemoryUploadedFileStore::new();
        let first = store.create_file(new_file("exe")).await.unwrap();
        let second = store.create_file(new_file("exe")).await.unwrap();
        store.create_file(new_file("pdf")).await.unwrap();

        assert!(store.delete_file(first.id).await.unwrap());
        assert!(!store.delete_file(first.id).await.unwrap());

        let active = store.find_active_files_by_extension("exe").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);

        let deleted = store.list_files(Some(FileStatus::Deleted)).await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(store.list_files(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_set_deletion_exception() {
        let store = InMemoryUploadedFileStore::new();
        let file = store.create_file(new_file("js")).await.unwrap();
        assert!(!file.deletion_exception);

        let updated = store
            .set_deletion_exception(file.id, true)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.deletion_exception);
        assert!(store
            .set_deletion_exception(Uuid::new_v4(), true)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_audit_listing_newest_first() {
        let store = InMemoryAuditLogStore::new();
        store
            .record(NewAuditLogEntry::allowed("a.pdf", 10))
            .await
            .unwrap();
        store
            .record(NewAuditLogEntry::blocked(
                "b.exe",
                20,
                "Blocked extension: exe",
                extgate_core::models::BlockReason::BlockedExtension,
                "exe",
            ))
            .await
            .unwrap();
        store
            .record(NewAuditLogEntry::allowed("c.txt", 30))
            .await
            .unwrap();

        let all = store.list_entries(10, 0).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].filename, "c.txt");

        let paged = store.list_entries(1, 1).await.unwrap();
        assert_eq!(paged[0].filename, "b.exe");

        let blocked = store.list_blocked_entries(10, 0).await.unwrap();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].blocked_extension.as_deref(), Some("exe"));
    }
}
