use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::BlockReason;

/// Recorded allow/block decision for an upload or upload check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLogEntry {
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

/// Insert payload for an audit entry. Built with the `allowed`/`blocked`
/// constructors and the `with_*` request-context setters.
#[derive(Debug, Clone)]
pub struct NewAuditLogEntry {
    pub filename: String,
    pub file_size: i64,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub block_reason_kind: Option<BlockReason>,
    pub blocked_extension: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl NewAuditLogEntry {
    pub fn allowed(filename: impl Into<String>, file_size: i64) -> Self {
        Self {
            filename: filename.into(),
            file_size,
            blocked: false,
            block_reason: None,
            block_reason_kind: None,
            blocked_extension: None,
            client_ip: None,
            user_agent: None,
        }
    }

    pub fn blocked(
        filename: impl Into<String>,
        file_size: i64,
        reason: impl Into<String>,
        kind: BlockReason,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            file_size,
            blocked: true,
            block_reason: Some(reason.into()),
            block_reason_kind: Some(kind),
            blocked_extension: Some(extension.into()),
            client_ip: None,
            user_agent: None,
        }
    }

    pub fn with_client_ip(mut self, ip: Option<String>) -> Self {
        self.client_ip = ip;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Query parameters for audit listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
