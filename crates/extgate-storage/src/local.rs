use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Blobs as plain files under a root directory.
///
/// Writes go to a `.partial` sibling first and are renamed into place, so a
/// reader never sees a half-written upload.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Open (and create when missing) the blob root, e.g. `./uploads`.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Cannot prepare blob root {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key onto the blob root. Only plain relative components are accepted.
    fn resolve(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(storage_key);
        let plain = !storage_key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StorageError::InvalidKey(format!(
                "'{}' is not a relative blob key",
                storage_key
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        storage_key: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let target = self.resolve(storage_key)?;
        let started = Instant::now();

        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).await?;
        }

        let partial = target.with_extension("partial");
        let write = async {
            let mut file = fs::File::create(&partial).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            fs::rename(&partial, &target).await
        };
        if let Err(e) = write.await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::UploadFailed(format!(
                "{}: {}",
                target.display(),
                e
            )));
        }

        tracing::debug!(
            key = %storage_key,
            size_bytes = data.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Blob written"
        );
        Ok(storage_key.to_string())
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(storage_key)?;
        fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(storage_key.to_string()),
            _ => StorageError::DownloadFailed(format!("{}: {}", path.display(), e)),
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.resolve(storage_key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key = %storage_key, "Blob removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.resolve(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage() -> (TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("blobs")).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (_dir, storage) = storage().await;

        let key = storage
            .upload("uploads/notes.txt", "text/plain", b"hello".to_vec())
            .await
            .unwrap();

        assert_eq!(key, "uploads/notes.txt");
        assert!(storage.root().join("uploads/notes.txt").is_file());
        assert!(!storage.root().join("uploads/notes.partial").exists());
        assert_eq!(storage.download(&key).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let (_dir, storage) = storage().await;
        storage.upload("uploads/a", "", b"one".to_vec()).await.unwrap();
        storage.upload("uploads/a", "", b"two".to_vec()).await.unwrap();
        assert_eq!(storage.download("uploads/a").await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_keys_outside_root_rejected() {
        let (_dir, storage) = storage().await;

        for key in ["", "../secret", "uploads/../../x", "/etc/passwd", "./uploads/a"] {
            assert!(
                matches!(storage.exists(key).await, Err(StorageError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
        assert!(matches!(
            storage.upload("../x", "", vec![1]).await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, storage) = storage().await;
        let key = storage
            .upload("uploads/setup.exe", "application/octet-stream", b"MZ".to_vec())
            .await
            .unwrap();

        storage.delete(&key).await.unwrap();
        storage.delete(&key).await.unwrap();

        assert!(!storage.exists(&key).await.unwrap());
        assert!(matches!(
            storage.download(&key).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_root_is_created() {
        let (dir, storage) = storage().await;
        assert!(dir.path().join("blobs").is_dir());
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}
