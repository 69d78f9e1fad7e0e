//! Service wiring

use anyhow::{Context, Result};
use extgate_core::Config;
use extgate_services::{
    AuditService, ExtensionPolicyService, FileCleanupService, FileStorageService,
    FileValidationService, Storage,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::stores::Stores;
use crate::state::AppState;

/// Build the services on top of the given stores and seed the fixed extensions.
pub async fn initialize_services(
    config: &Config,
    stores: Stores,
    storage: Arc<dyn Storage>,
    pool: Option<PgPool>,
) -> Result<Arc<AppState>> {
    let cleanup = Arc::new(FileCleanupService::new(
        stores.files.clone(),
        storage.clone(),
    ));
    let policy = ExtensionPolicyService::new(stores.extensions.clone(), cleanup);

    let inserted = policy
        .seed_fixed_extensions(&config.fixed_extension_seed())
        .await
        .context("Failed to seed fixed extensions")?;
    tracing::info!(
        inserted,
        fixed_extensions = %config.fixed_extensions().join(","),
        "Fixed extensions seeded"
    );

    let validation = FileValidationService::new(policy.clone(), config.max_file_size_bytes());
    let files = FileStorageService::new(stores.files.clone(), storage.clone());
    let audit = AuditService::new(stores.audit.clone());

    Ok(Arc::new(AppState {
        config: config.clone(),
        pool,
        storage,
        policy,
        validation,
        files,
        audit,
    }))
}
