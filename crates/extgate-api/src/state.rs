//! Application state shared by every handler.

use extgate_core::Config;
use extgate_services::{
    AuditService, ExtensionPolicyService, FileStorageService, FileValidationService, Storage,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Present only with the postgres store backend
    pub pool: Option<PgPool>,
    pub storage: Arc<dyn Storage>,
    pub policy: ExtensionPolicyService,
    pub validation: FileValidationService,
    pub files: FileStorageService,
    pub audit: AuditService,
}
