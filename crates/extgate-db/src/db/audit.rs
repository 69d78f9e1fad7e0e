//! Audit log repository: upload_audit_logs table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use extgate_core::models::{AuditLogEntry, BlockReason, NewAuditLogEntry};
use extgate_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::traits::AuditLogStore;

/// Row type for upload_audit_logs table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct AuditLogRow {
    pub id: Uuid,
    pub filename: String,
    pub file_size: i64,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub block_reason_kind: Option<BlockReason>,
    pub blocked_extension: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditLogRow {
    pub fn to_entry(self) -> AuditLogEntry {
        AuditLogEntry {
            id: self.id,
            filename: self.filename,
            file_size: self.file_size,
            blocked: self.blocked,
            block_reason: self.block_reason,
            block_reason_kind: self.block_reason_kind,
            blocked_extension: self.blocked_extension,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
        }
    }
}

/// Repository for upload_audit_logs table.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogStore for AuditLogRepository {
    #[tracing::instrument(skip(self, entry), fields(db.table = "upload_audit_logs", blocked = entry.blocked))]
    async fn record(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, AppError> {
        let row: AuditLogRow = sqlx::query_as::<Postgres, AuditLogRow>(
            r#"
            INSERT INTO upload_audit_logs
                (id, filename, file_size, blocked, block_reason, block_reason_kind,
                 blocked_extension, client_ip, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, filename, file_size, blocked, block_reason, block_reason_kind,
                      blocked_extension, client_ip, user_agent, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&entry.filename)
        .bind(entry.file_size)
        .bind(entry.blocked)
        .bind(&entry.block_reason)
        .bind(entry.block_reason_kind)
        .bind(&entry.blocked_extension)
        .bind(&entry.client_ip)
        .bind(&entry.user_agent)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.to_entry())
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_audit_logs"))]
    async fn list_entries(&self, limit: i64, offset: i64) -> Result<Vec<AuditLogEntry>, AppError> {
        let rows: Vec<AuditLogRow> = sqlx::query_as::<Postgres, AuditLogRow>(
            r#"
            SELECT id, filename, file_size, blocked, block_reason, block_reason_kind,
                   blocked_extension, client_ip, user_agent, created_at
            FROM upload_audit_logs
            ORDER BY created_at DESC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AuditLogRow::to_entry).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_audit_logs"))]
    async fn list_blocked_entries(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntry>, AppError> {
        let rows: Vec<AuditLogRow> = sqlx::query_as::<Postgres, AuditLogRow>(
            r#"
            SELECT id, filename, file_size, blocked, block_reason, block_reason_kind,
                   blocked_extension, client_ip, user_agent, created_at
            FROM upload_audit_logs
            WHERE blocked = TRUE
            ORDER BY created_at DESC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AuditLogRow::to_entry).collect())
    }
}
