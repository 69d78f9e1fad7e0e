//! In-memory storage backend
//!
//! Used by `STORAGE_BACKEND=memory` deployments and throughout the test suites.

use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage implementation that keeps blobs in a map
#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failing_deletes: Arc<Mutex<HashSet<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a blob exists
    pub fn has_file(&self, key: &str) -> bool {
        lock(&self.files).contains_key(key)
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        lock(&self.files).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every later `delete` of `key` fail with `DeleteFailed`.
    pub fn fail_deletes_for(&self, key: &str) {
        lock(&self.failing_deletes).insert(key.to_string());
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload(
        &self,
        storage_key: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        if storage_key.is_empty() {
            return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
        }
        lock(&self.files).insert(storage_key.to_string(), data);
        Ok(storage_key.to_string())
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        lock(&self.files)
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if lock(&self.failing_deletes).contains(storage_key) {
            return Err(StorageError::DeleteFailed(format!(
                "Delete of {} rejected",
                storage_key
            )));
        }
        lock(&self.files).remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.has_file(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_roundtrip_and_delete() {
        let storage = MemoryStorage::new();
        storage
            .upload("uploads/a.txt", "text/plain", b"hello".to_vec())
            .await
            .unwrap();

        assert_eq!(storage.download("uploads/a.txt").await.unwrap(), b"hello");
        assert!(storage.exists("uploads/a.txt").await.unwrap());

        storage.delete("uploads/a.txt").await.unwrap();
        storage.delete("uploads/a.txt").await.unwrap();
        assert!(storage.is_empty());
        assert!(matches!(
            storage.download("uploads/a.txt").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_injected_delete_failure() {
        let storage = MemoryStorage::new();
        storage
            .upload("uploads/b.exe", "application/octet-stream", vec![0])
            .await
            .unwrap();
        storage.fail_deletes_for("uploads/b.exe");

        assert!(matches!(
            storage.delete("uploads/b.exe").await,
            Err(StorageError::DeleteFailed(_))
        ));
        assert!(storage.has_file("uploads/b.exe"));
    }
}
