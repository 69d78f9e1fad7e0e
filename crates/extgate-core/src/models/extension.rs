use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A member of the pre-seeded fixed vocabulary with its togglable block flag.
///
/// Rows are created once by seeding and never deleted; only `is_blocked` and
/// `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FixedExtensionSetting {
    pub id: Uuid,
    pub extension: String,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Administrator-added extension. Existence means blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomExtension {
    pub id: Uuid,
    pub extension: String,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for toggling a fixed extension
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFixedExtensionRequest {
    pub is_blocked: bool,
}

/// Request DTO for adding a custom extension.
///
/// The token is checked after normalization, so `" .SH "` is accepted as `sh`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCustomExtensionRequest {
    pub extension: String,
}

/// Union of everything currently blocking uploads.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BlockedExtensionsResponse {
    pub extensions: Vec<String>,
    pub fixed_count: usize,
    pub custom_count: usize,
}

/// Result of a filename pre-check.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExtensionCheckResponse {
    pub file_name: String,
    pub is_blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_extension: Option<String>,
}
