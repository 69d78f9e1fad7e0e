//! Uploaded-file lifecycle: blob plus metadata record.

use bytes::Bytes;
use extgate_core::extension::{final_extension, normalize_extension};
use extgate_core::models::{FileStatus, NewUploadedFile, UploadedFile};
use extgate_core::AppError;
use extgate_db::UploadedFileStore;
use extgate_storage::{generate_storage_key, stored_filename, Storage};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone)]
pub struct FileStorageService {
    files: Arc<dyn UploadedFileStore>,
    storage: Arc<dyn Storage>,
}

impl FileStorageService {
    pub fn new(files: Arc<dyn UploadedFileStore>, storage: Arc<dyn Storage>) -> Self {
        Self { files, storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Store an already validated upload. The blob is written first; when the
    /// metadata insert fails the blob is removed again.
    #[tracing::instrument(skip(self, data), fields(upload.filename = %filename, upload.size = data.len()))]
    pub async fn store_file(
        &self,
        filename: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> Result<UploadedFile, AppError> {
        let id = Uuid::new_v4();
        let extension = final_extension(filename);
        // Only plain tokens make it into the blob name.
        let key_extension = if extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            extension.as_str()
        } else {
            ""
        };
        let key = generate_storage_key(id, key_extension);
        let file_size = data.len() as i64;

        let file_path = self
            .storage
            .upload(
                &key,
                content_type.unwrap_or(DEFAULT_CONTENT_TYPE),
                data.to_vec(),
            )
            .await?;

        let record = NewUploadedFile {
            id,
            original_filename: filename.to_string(),
            stored_filename: stored_filename(id, key_extension),
            file_path: file_path.clone(),
            extension,
            file_size,
            content_type: content_type.map(str::to_string),
        };

        match self.files.create_file(record).await {
            Ok(file) => {
                tracing::info!(
                    file_id = %file.id,
                    filename = %file.original_filename,
                    key = %file.file_path,
                    "File stored"
                );
                Ok(file)
            }
            Err(e) => {
                if let Err(cleanup_err) = self.storage.delete(&file_path).await {
                    tracing::error!(
                        error = %cleanup_err,
                        key = %file_path,
                        "Failed to remove blob after metadata insert failure"
                    );
                }
                Err(e)
            }
        }
    }

    pub async fn get_file(&self, id: Uuid) -> Result<UploadedFile, AppError> {
        self.files
            .get_file(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))
    }

    /// Metadata and bytes of an ACTIVE file. Deleted files are reported as missing.
    pub async fn download_file(&self, id: Uuid) -> Result<(UploadedFile, Vec<u8>), AppError> {
        let file = self.get_file(id).await?;
        if !file.is_active() {
            return Err(AppError::NotFound(format!("File {} not found", id)));
        }
        let data = self.storage.download(&file.file_path).await?;
        Ok((file, data))
    }

    pub async fn list_files(&self, status: Option<FileStatus>) -> Result<Vec<UploadedFile>, AppError> {
        self.files.list_files(status).await
    }

    pub async fn list_files_by_extension(
        &self,
        extension: &str,
    ) -> Result<Vec<UploadedFile>, AppError> {
        self.files
            .list_files_by_extension(&normalize_extension(extension))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_deletion_exception(
        &self,
        id: Uuid,
        deletion_exception: bool,
    ) -> Result<UploadedFile, AppError> {
        let file = self
            .files
            .set_deletion_exception(id, deletion_exception)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

        tracing::info!(
            file_id = %file.id,
            deletion_exception = file.deletion_exception,
            "File protection updated"
        );
        Ok(file)
    }
}
