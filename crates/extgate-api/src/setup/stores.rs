//! Policy, file and audit store selection

use anyhow::Result;
use extgate_core::{Config, StoreBackend};
use extgate_db::{
    AuditLogRepository, AuditLogStore, ExtensionPolicyStore, ExtensionRepository,
    InMemoryAuditLogStore, InMemoryExtensionStore, InMemoryUploadedFileStore,
    UploadedFileRepository, UploadedFileStore,
};
use sqlx::PgPool;
use std::sync::Arc;

/// The three stores the services are built on.
#[derive(Clone)]
pub struct Stores {
    pub extensions: Arc<dyn ExtensionPolicyStore>,
    pub files: Arc<dyn UploadedFileStore>,
    pub audit: Arc<dyn AuditLogStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            extensions: Arc::new(ExtensionRepository::new(pool.clone())),
            files: Arc::new(UploadedFileRepository::new(pool.clone())),
            audit: Arc::new(AuditLogRepository::new(pool)),
        }
    }

    /// Process-local stores; state is lost on restart.
    pub fn memory() -> Self {
        Self {
            extensions: Arc::new(InMemoryExtensionStore::new()),
            files: Arc::new(InMemoryUploadedFileStore::new()),
            audit: Arc::new(InMemoryAuditLogStore::new()),
        }
    }
}

/// Build the stores for the configured backend. Returns the pool when one was opened.
pub async fn setup_stores(config: &Config) -> Result<(Stores, Option<PgPool>)> {
    match config.store_backend() {
        StoreBackend::Postgres => {
            let pool = super::database::setup_database(config).await?;
            Ok((Stores::postgres(pool.clone()), Some(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores; policy and file records are not persisted");
            Ok((Stores::memory(), None))
        }
    }
}
