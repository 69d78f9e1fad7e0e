//! Extension policy repository: fixed_extension_settings and custom_extensions tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use extgate_core::models::{CustomExtension, FixedExtensionSetting};
use extgate_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::map_unique_violation;
use crate::traits::ExtensionPolicyStore;

/// Row type for fixed_extension_settings table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct FixedExtensionRow {
    pub id: Uuid,
    pub extension: String,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FixedExtensionRow {
    pub fn to_setting(self) -> FixedExtensionSetting {
        FixedExtensionSetting {
            id: self.id,
            extension: self.extension,
            is_blocked: self.is_blocked,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Row type for custom_extensions table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct CustomExtensionRow {
    pub id: Uuid,
    pub extension: String,
    pub created_at: DateTime<Utc>,
}

impl CustomExtensionRow {
    pub fn to_custom_extension(self) -> CustomExtension {
        CustomExtension {
            id: self.id,
            extension: self.extension,
            created_at: self.created_at,
        }
    }
}

/// Repository for fixed and custom extension policy rows.
#[derive(Clone)]
pub struct ExtensionRepository {
    pool: PgPool,
}

impl ExtensionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExtensionPolicyStore for ExtensionRepository {
    #[tracing::instrument(skip(self), fields(db.table = "fixed_extension_settings"))]
    async fn find_fixed_extension(
        &self,
        extension: &str,
    ) -> Result<Option<FixedExtensionSetting>, AppError> {
        let row: Option<FixedExtensionRow> = sqlx::query_as::<Postgres, FixedExtensionRow>(
            r#"
            SELECT id, extension, is_blocked, created_at, updated_at
            FROM fixed_extension_settings
            WHERE extension = $1
            "#,
        )
        .bind(extension)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FixedExtensionRow::to_setting))
    }

    #[tracing::instrument(skip(self), fields(db.table = "fixed_extension_settings"))]
    async fn list_fixed_extensions(&self) -> Result<Vec<FixedExtensionSetting>, AppError> {
        let rows: Vec<FixedExtensionRow> = sqlx::query_as::<Postgres, FixedExtensionRow>(
            r#"
            SELECT id, extension, is_blocked, created_at, updated_at
            FROM fixed_extension_settings
            ORDER BY created_at ASC, extension ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FixedExtensionRow::to_setting).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "fixed_extension_settings"))]
    async fn save_fixed_setting(
        &self,
        extension: &str,
        is_blocked: bool,
    ) -> Result<Option<FixedExtensionSetting>, AppError> {
        let row: Option<FixedExtensionRow> = sqlx::query_as::<Postgres, FixedExtensionRow>(
            r#"
            UPDATE fixed_extension_settings
            SET is_blocked = $2, updated_at = NOW()
            WHERE extension = $1
            RETURNING id, extension, is_blocked, created_at, updated_at
            "#,
        )
        .bind(extension)
        .bind(is_blocked)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FixedExtensionRow::to_setting))
    }

    #[tracing::instrument(skip(self, defaults), fields(db.table = "fixed_extension_settings", count = defaults.len()))]
    async fn seed_fixed_extensions(&self, defaults: &[(String, bool)]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for (extension, is_blocked) in defaults {
            let result = sqlx::query(
                r#"
                INSERT INTO fixed_extension_settings (id, extension, is_blocked)
                VALUES ($1, $2, $3)
                ON CONFLICT (extension) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(extension)
            .bind(is_blocked)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    #[tracing::instrument(skip(self), fields(db.table = "custom_extensions"))]
    async fn find_custom_extension(
        &self,
        extension: &str,
    ) -> Result<Option<CustomExtension>, AppError> {
        let row: Option<CustomExtensionRow> = sqlx::query_as::<Postgres, CustomExtensionRow>(
            "SELECT id, extension, created_at FROM custom_extensions WHERE extension = $1",
        )
        .bind(extension)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CustomExtensionRow::to_custom_extension))
    }

    #[tracing::instrument(skip(self), fields(db.table = "custom_extensions", db.record_id = %id))]
    async fn find_custom_extension_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<CustomExtension>, AppError> {
        let row: Option<CustomExtensionRow> = sqlx::query_as::<Postgres, CustomExtensionRow>(
            "SELECT id, extension, created_at FROM custom_extensions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CustomExtensionRow::to_custom_extension))
    }

    #[tracing::instrument(skip(self), fields(db.table = "custom_extensions"))]
    async fn list_custom_extensions(&self) -> Result<Vec<CustomExtension>, AppError> {
        let rows: Vec<CustomExtensionRow> = sqlx::query_as::<Postgres, CustomExtensionRow>(
            r#"
            SELECT id, extension, created_at
            FROM custom_extensions
            ORDER BY created_at ASC, extension ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(CustomExtensionRow::to_custom_extension)
            .collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "custom_extensions"))]
    async fn count_custom_extensions(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM custom_extensions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "custom_extensions"))]
    async fn save_custom_extension(&self, extension: &str) -> Result<CustomExtension, AppError> {
        let row: CustomExtensionRow = sqlx::query_as::<Postgres, CustomExtensionRow>(
            r#"
            INSERT INTO custom_extensions (id, extension)
            VALUES ($1, $2)
            RETURNING id, extension, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(extension)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                format!("Custom extension '{}' already exists", extension)
            })
        })?;
        Ok(row.to_custom_extension())
    }

    #[tracing::instrument(skip(self), fields(db.table = "custom_extensions", db.record_id = %id))]
    async fn delete_custom_extension(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM custom_extensions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
