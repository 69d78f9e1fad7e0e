use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::{extract_multipart_file, request_context, UploadOutcome, UploadService};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use extgate_core::models::{UploadBlockedResponse, UploadCheckResponse, UploadResponse};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v0/upload/file",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Blocked by extension policy; empty, unnamed or oversized files (code PAYLOAD_TOO_LARGE) answer with an ErrorResponse", body = UploadBlockedResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let ctx = request_context(&headers);
    let file = extract_multipart_file(multipart).await?;

    let response = match UploadService::new(&state).upload_file(file, &ctx).await? {
        UploadOutcome::Stored(body) => (StatusCode::OK, Json(body)).into_response(),
        UploadOutcome::Blocked(body) => (StatusCode::BAD_REQUEST, Json(body)).into_response(),
    };
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/v0/upload/check",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Allowed or blocked decision", body = UploadCheckResponse),
        (status = 400, description = "Empty file, missing name or file over the size ceiling (code PAYLOAD_TOO_LARGE)", body = ErrorResponse)
    )
)]
pub async fn check_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let ctx = request_context(&headers);
    let file = extract_multipart_file(multipart).await?;
    let result = UploadService::new(&state).check_file(file, &ctx).await?;
    Ok(Json(result))
}
