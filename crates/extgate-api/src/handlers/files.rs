use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue, Response},
    response::IntoResponse,
    Json,
};
use extgate_core::models::{FileStatus, UpdateFileProtectionRequest, UploadedFile};
use extgate_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileListQuery {
    /// ACTIVE or DELETED; all files when omitted
    pub status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v0/files",
    tag = "files",
    params(FileListQuery),
    responses(
        (status = 200, description = "Uploaded files, newest first", body = Vec<UploadedFile>),
        (status = 400, description = "Unknown status", body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FileListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<FileStatus>)
        .transpose()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    Ok(Json(state.files.list_files(status).await?))
}

#[utoipa::path(
    get,
    path = "/api/v0/files/{id}",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File metadata", body = UploadedFile),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.files.get_file(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v0/files/{id}/download",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found or deleted", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(file_id = %id, operation = "download_file"))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response<Body>, HttpAppError> {
    let (file, data) = state.files.download_file(id).await?;

    let content_type = file
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        file.original_filename.replace('"', "")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let mut response = Response::new(Body::from(data));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/v0/files/extension/{extension}",
    tag = "files",
    params(
        ("extension" = String, Path, description = "Extension, normalized before lookup")
    ),
    responses(
        (status = 200, description = "Files stored under the extension", body = Vec<UploadedFile>)
    )
)]
pub async fn list_files_by_extension(
    State(state): State<Arc<AppState>>,
    Path(extension): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.files.list_files_by_extension(&extension).await?))
}

#[utoipa::path(
    put,
    path = "/api/v0/files/{id}/protection",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    request_body = UpdateFileProtectionRequest,
    responses(
        (status = 200, description = "Protection updated", body = UploadedFile),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn update_file_protection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateFileProtectionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let file = state
        .files
        .set_deletion_exception(id, request.deletion_exception)
        .await?;
    Ok(Json(file))
}
