//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use extgate_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "extgate API",
        version = "0.1.0",
        description = "Upload gatekeeper (v0): extension policy administration, validated uploads, stored file management and the upload audit trail. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::health::health_check,
        // Extension policy
        handlers::extensions::list_fixed_extensions,
        handlers::extensions::update_fixed_extension,
        handlers::extensions::list_custom_extensions,
        handlers::extensions::add_custom_extension,
        handlers::extensions::delete_custom_extension,
        handlers::extensions::list_blocked_extensions,
        handlers::extensions::check_extension,
        // Uploads
        handlers::upload::upload_file,
        handlers::upload::check_file,
        // Files
        handlers::files::list_files,
        handlers::files::get_file,
        handlers::files::download_file,
        handlers::files::list_files_by_extension,
        handlers::files::update_file_protection,
        // Audit
        handlers::audit::list_audit_entries,
        handlers::audit::list_blocked_audit_entries,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::health::HealthCheckResponse,
        models::FixedExtensionSetting,
        models::CustomExtension,
        models::UpdateFixedExtensionRequest,
        models::AddCustomExtensionRequest,
        models::BlockedExtensionsResponse,
        models::ExtensionCheckResponse,
        models::BlockReason,
        models::FileStatus,
        models::UploadedFile,
        models::UploadResponse,
        models::UploadBlockedResponse,
        models::UploadCheckResponse,
        models::UpdateFileProtectionRequest,
        models::AuditLogEntry,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "extensions", description = "Fixed and custom extension policy"),
        (name = "upload", description = "Validated uploads and dry-run checks"),
        (name = "files", description = "Stored files and deletion protection"),
        (name = "audit", description = "Upload decision audit trail")
    )
)]
pub struct ApiDoc;
