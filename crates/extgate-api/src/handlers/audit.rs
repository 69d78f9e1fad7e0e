use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use extgate_core::models::{AuditListQuery, AuditLogEntry};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/v0/audit",
    tag = "audit",
    params(AuditListQuery),
    responses(
        (status = 200, description = "Upload decisions, newest first", body = Vec<AuditLogEntry>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_audit_entries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuditListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let entries = state.audit.list_entries(query.limit, query.offset).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/v0/audit/blocked",
    tag = "audit",
    params(AuditListQuery),
    responses(
        (status = 200, description = "Blocked uploads, newest first", body = Vec<AuditLogEntry>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_blocked_audit_entries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuditListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let entries = state
        .audit
        .list_blocked_entries(query.limit, query.offset)
        .await?;
    Ok(Json(entries))
}
