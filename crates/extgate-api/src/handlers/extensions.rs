//! Extension policy administration and filename pre-check.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use extgate_core::models::{
    AddCustomExtensionRequest, BlockedExtensionsResponse, CustomExtension,
    ExtensionCheckResponse, FixedExtensionSetting, UpdateFixedExtensionRequest,
};
use extgate_core::AppError;
use extgate_services::FixedExtensionStates;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/v0/extensions/fixed",
    tag = "extensions",
    responses(
        (status = 200, description = "Fixed extension settings", body = Vec<FixedExtensionSetting>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_fixed_extensions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.policy.list_fixed_extensions().await?))
}

#[utoipa::path(
    put,
    path = "/api/v0/extensions/fixed/{extension}",
    tag = "extensions",
    params(
        ("extension" = String, Path, description = "Fixed extension, e.g. exe")
    ),
    request_body = UpdateFixedExtensionRequest,
    responses(
        (status = 200, description = "Setting updated", body = FixedExtensionSetting),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "Not a fixed extension", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "update_fixed_extension"))]
pub async fn update_fixed_extension(
    State(state): State<Arc<AppState>>,
    Path(extension): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateFixedExtensionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let setting = state
        .policy
        .update_fixed_extension(&extension, request.is_blocked)
        .await?;
    Ok(Json(setting))
}

#[utoipa::path(
    get,
    path = "/api/v0/extensions/custom",
    tag = "extensions",
    responses(
        (status = 200, description = "Custom extensions", body = Vec<CustomExtension>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_custom_extensions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.policy.list_custom_extensions().await?))
}

#[utoipa::path(
    post,
    path = "/api/v0/extensions/custom",
    tag = "extensions",
    request_body = AddCustomExtensionRequest,
    responses(
        (status = 201, description = "Custom extension added", body = CustomExtension),
        (status = 400, description = "Invalid, duplicate, conflicting, or over the limit", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "add_custom_extension"))]
pub async fn add_custom_extension(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<AddCustomExtensionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let custom = state.policy.add_custom_extension(&request.extension).await?;
    Ok((StatusCode::CREATED, Json(custom)))
}

#[utoipa::path(
    delete,
    path = "/api/v0/extensions/custom/{id}",
    tag = "extensions",
    params(
        ("id" = Uuid, Path, description = "Custom extension ID")
    ),
    responses(
        (status = 204, description = "Custom extension deleted"),
        (status = 404, description = "Custom extension not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_custom_extension"))]
pub async fn delete_custom_extension(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.policy.delete_custom_extension(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v0/extensions/blocked",
    tag = "extensions",
    responses(
        (status = 200, description = "Blocked fixed extensions followed by custom ones", body = BlockedExtensionsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_blocked_extensions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.policy.blocked_extension_summary().await?))
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ExtensionCheckQuery {
    /// Filename to check
    #[validate(length(min = 1, message = "file_name must not be empty"))]
    pub file_name: String,
    /// JSON object of fixed extension flags, e.g. `{"exe":true,"bat":false}`.
    /// When present it replaces the stored fixed settings for this check.
    pub fixed_extension_states: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v0/extensions/check",
    tag = "extensions",
    params(ExtensionCheckQuery),
    responses(
        (status = 200, description = "Check result", body = ExtensionCheckResponse),
        (status = 400, description = "Empty file_name or malformed fixed_extension_states", body = ErrorResponse)
    )
)]
pub async fn check_extension(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExtensionCheckQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    query.validate()?;
    let fixed_states = query
        .fixed_extension_states
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(serde_json::from_str::<FixedExtensionStates>)
        .transpose()
        .map_err(|e| {
            AppError::InvalidInput(format!("Invalid fixed_extension_states: {}", e))
        })?;

    let blocked_extension = state
        .policy
        .find_blocked_extension(&query.file_name, fixed_states.as_ref())
        .await?;

    Ok(Json(ExtensionCheckResponse {
        file_name: query.file_name,
        is_blocked: blocked_extension.is_some(),
        blocked_extension,
    }))
}
