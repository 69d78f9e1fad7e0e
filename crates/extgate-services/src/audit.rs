//! Audit trail of upload decisions
//!
//! Every upload and upload check ends up here as either an allowed or a blocked
//! entry. Writes are best effort: a failing audit store is logged and never
//! turns a finished upload into an error.

use extgate_core::models::{AuditLogEntry, NewAuditLogEntry, ValidationVerdict};
use extgate_core::AppError;
use extgate_db::AuditLogStore;
use std::sync::Arc;

pub const DEFAULT_AUDIT_LIMIT: i64 = 50;
pub const MAX_AUDIT_LIMIT: i64 = 500;

/// Client details attached to audit entries.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn AuditLogStore>,
}

impl AuditService {
    pub fn new(store: Arc<dyn AuditLogStore>) -> Self {
        Self { store }
    }

    /// Trace the start of an upload. Nothing is persisted until a decision exists.
    pub fn log_upload_attempt(&self, filename: &str, file_size: usize, ctx: &RequestContext) {
        tracing::info!(
            filename = %filename,
            file_size = file_size,
            client_ip = ctx.client_ip.as_deref().unwrap_or("unknown"),
            "Upload attempt"
        );
    }

    /// Record the policy decision for a file.
    pub async fn log_verdict(
        &self,
        filename: &str,
        file_size: usize,
        verdict: &ValidationVerdict,
        ctx: &RequestContext,
    ) {
        match verdict {
            ValidationVerdict::Allowed => {
                self.log_successful_upload(filename, file_size, ctx).await
            }
            ValidationVerdict::Blocked {
                reason,
                kind,
                extension,
            } => {
                let entry = NewAuditLogEntry::blocked(
                    filename,
                    file_size as i64,
                    reason.as_str(),
                    *kind,
                    extension.as_str(),
                );
                tracing::warn!(
                    filename = %filename,
                    blocked_extension = %extension,
                    reason = %reason,
                    "Upload blocked"
                );
                self.record(entry, ctx).await;
            }
        }
    }

    pub async fn log_successful_upload(&self, filename: &str, file_size: usize, ctx: &RequestContext) {
        let entry = NewAuditLogEntry::allowed(filename, file_size as i64);
        self.record(entry, ctx).await;
    }

    pub async fn log_blocked_upload(
        &self,
        filename: &str,
        file_size: usize,
        verdict: &ValidationVerdict,
        ctx: &RequestContext,
    ) {
        if verdict.is_blocked() {
            self.log_verdict(filename, file_size, verdict, ctx).await;
        }
    }

    async fn record(&self, entry: NewAuditLogEntry, ctx: &RequestContext) {
        let entry = entry
            .with_client_ip(ctx.client_ip.clone())
            .with_user_agent(ctx.user_agent.clone());
        let filename = entry.filename.clone();

        if let Err(e) = self.store.record(entry).await {
            tracing::error!(error = %e, filename = %filename, "Failed to write audit log entry");
        }
    }

    pub async fn list_entries(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AuditLogEntry>, AppError> {
        let (limit, offset) = clamp_page(limit, offset);
        self.store.list_entries(limit, offset).await
    }

    pub async fn list_blocked_entries(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AuditLogEntry>, AppError> {
        let (limit, offset) = clamp_page(limit, offset);
        self.store.list_blocked_entries(limit, offset).await
    }
}

fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}
