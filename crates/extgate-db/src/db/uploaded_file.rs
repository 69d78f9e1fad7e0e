//! Uploaded file repository: uploaded_files table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use extgate_core::models::{FileStatus, NewUploadedFile, UploadedFile};
use extgate_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::traits::UploadedFileStore;

const FILE_COLUMNS: &str = "id, original_filename, stored_filename, file_path, extension, \
     file_size, content_type, status, deletion_exception, created_at, updated_at";

/// Row type for uploaded_files table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct UploadedFileRow {
    pub id: Uuid,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_path: String,
    pub extension: String,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub status: FileStatus,
    pub deletion_exception: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UploadedFileRow {
    pub fn to_uploaded_file(self) -> UploadedFile {
        UploadedFile {
            id: self.id,
            original_filename: self.original_filename,
            stored_filename: self.stored_filename,
            file_path: self.file_path,
            extension: self.extension,
            file_size: self.file_size,
            content_type: self.content_type,
            status: self.status,
            deletion_exception: self.deletion_exception,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for uploaded_files table.
#[derive(Clone)]
pub struct UploadedFileRepository {
    pool: PgPool,
}

impl UploadedFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadedFileStore for UploadedFileRepository {
    #[tracing::instrument(skip(self, file), fields(db.table = "uploaded_files", db.record_id = %file.id))]
    async fn create_file(&self, file: NewUploadedFile) -> Result<UploadedFile, AppError> {
        let query = format!(
            r#"
            INSERT INTO uploaded_files
                (id, original_filename, stored_filename, file_path, extension, file_size, content_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            FILE_COLUMNS
        );
        let row: UploadedFileRow = sqlx::query_as::<Postgres, UploadedFileRow>(&query)
            .bind(file.id)
            .bind(&file.original_filename)
            .bind(&file.stored_filename)
            .bind(&file.file_path)
            .bind(&file.extension)
            .bind(file.file_size)
            .bind(&file.content_type)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.to_uploaded_file())
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploaded_files", db.record_id = %id))]
    async fn get_file(&self, id: Uuid) -> Result<Option<UploadedFile>, AppError> {
        let query = format!("SELECT {} FROM uploaded_files WHERE id = $1", FILE_COLUMNS);
        let row: Option<UploadedFileRow> = sqlx::query_as::<Postgres, UploadedFileRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UploadedFileRow::to_uploaded_file))
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploaded_files"))]
    async fn list_files(&self, status: Option<FileStatus>) -> Result<Vec<UploadedFile>, AppError> {
        let query = format!(
            r#"
            SELECT {}
            FROM uploaded_files
            WHERE ($1::file_status IS NULL OR status = $1)
            ORDER BY created_at DESC, id ASC
            "#,
            FILE_COLUMNS
        );
        let rows: Vec<UploadedFileRow> = sqlx::query_as::<Postgres, UploadedFileRow>(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(UploadedFileRow::to_uploaded_file).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploaded_files"))]
    async fn list_files_by_extension(
        &self,
        extension: &str,
    ) -> Result<Vec<UploadedFile>, AppError> {
        let query = format!(
            r#"
            SELECT {}
            FROM uploaded_files
            WHERE extension = $1
            ORDER BY created_at DESC, id ASC
            "#,
            FILE_COLUMNS
        );
        let rows: Vec<UploadedFileRow> = sqlx::query_as::<Postgres, UploadedFileRow>(&query)
            .bind(extension)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(UploadedFileRow::to_uploaded_file).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploaded_files"))]
    async fn find_active_files_by_extension(
        &self,
        extension: &str,
    ) -> Result<Vec<UploadedFile>, AppError> {
        let query = format!(
            r#"
            SELECT {}
            FROM uploaded_files
            WHERE extension = $1 AND status = 'ACTIVE'
            ORDER BY created_at DESC, id ASC
            "#,
            FILE_COLUMNS
        );
        let rows: Vec<UploadedFileRow> = sqlx::query_as::<Postgres, UploadedFileRow>(&query)
            .bind(extension)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(UploadedFileRow::to_uploaded_file).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploaded_files", db.record_id = %id))]
    async fn delete_file(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE uploaded_files
            SET status = 'DELETED', updated_at = NOW()
            WHERE id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploaded_files", db.record_id = %id))]
    async fn set_deletion_exception(
        &self,
        id: Uuid,
        deletion_exception: bool,
    ) -> Result<Option<UploadedFile>, AppError> {
        let query = format!(
            r#"
            UPDATE uploaded_files
            SET deletion_exception = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FILE_COLUMNS
        );
        let row: Option<UploadedFileRow> = sqlx::query_as::<Postgres, UploadedFileRow>(&query)
            .bind(id)
            .bind(deletion_exception)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UploadedFileRow::to_uploaded_file))
    }
}
