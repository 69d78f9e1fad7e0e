use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "file_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatus {
    Active,
    Deleted,
}

impl FromStr for FileStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(FileStatus::Active),
            "deleted" => Ok(FileStatus::Deleted),
            _ => Err(anyhow::anyhow!("Invalid file status: {}", s)),
        }
    }
}

impl Display for FileStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileStatus::Active => write!(f, "ACTIVE"),
            FileStatus::Deleted => write!(f, "DELETED"),
        }
    }
}

/// Metadata of a stored upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadedFile {
    pub id: Uuid,
    pub original_filename: String,
    pub stored_filename: String,
    /// Storage key of the blob
    pub file_path: String,
    /// Normalized final extension, empty when the name has none
    pub extension: String,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub status: FileStatus,
    /// Exempts the file from policy-driven deletion
    pub deletion_exception: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UploadedFile {
    pub fn is_active(&self) -> bool {
        self.status == FileStatus::Active
    }
}

/// Insert payload for a new uploaded file.
#[derive(Debug, Clone)]
pub struct NewUploadedFile {
    /// Chosen by the caller so the blob key can be derived before the insert
    pub id: Uuid,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_path: String,
    pub extension: String,
    pub file_size: i64,
    pub content_type: Option<String>,
}

/// Response DTO for a successful upload
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub file_id: Uuid,
    pub original_file_name: String,
    pub file_size: i64,
}

/// Response DTO for an upload rejected by policy
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadBlockedResponse {
    pub error: String,
    pub file_name: String,
    pub block_reason: super::BlockReason,
    pub blocked_extension: String,
}

/// Response DTO for a dry-run upload check
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadCheckResponse {
    /// "allowed" or "blocked"
    pub result: String,
    pub message: String,
    pub file_name: String,
    pub file_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<super::BlockReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_extension: Option<String>,
}

/// Request DTO for toggling a file's deletion exception
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFileProtectionRequest {
    pub deletion_exception: bool,
}
