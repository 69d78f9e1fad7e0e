//! Shared doubles for the service tests.

use async_trait::async_trait;
use extgate_core::models::{CustomExtension, FixedExtensionSetting};
use extgate_core::AppError;
use extgate_db::{ExtensionPolicyStore, InMemoryExtensionStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::policy::BlockedExtensionHook;

/// Memory store pre-seeded with `(extension, blocked)` fixed settings.
pub async fn seeded_store(fixed: &[(&str, bool)]) -> Arc<InMemoryExtensionStore> {
    let store = Arc::new(InMemoryExtensionStore::new());
    let seed: Vec<(String, bool)> = fixed
        .iter()
        .map(|(ext, blocked)| (ext.to_string(), *blocked))
        .collect();
    store.seed_fixed_extensions(&seed).await.unwrap();
    store
}

/// Records every extension the engine reports as newly blocked.
#[derive(Default)]
pub struct RecordingHook {
    calls: Mutex<Vec<String>>,
}

impl RecordingHook {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlockedExtensionHook for RecordingHook {
    async fn on_extension_blocked(&self, extension: &str) {
        self.calls.lock().unwrap().push(extension.to_string());
    }
}

/// Delegating store that counts fixed and custom point lookups.
pub struct CountingStore {
    inner: Arc<InMemoryExtensionStore>,
    fixed_lookups: AtomicUsize,
    custom_lookups: AtomicUsize,
    stale_custom_lookups: bool,
}

impl CountingStore {
    pub fn new(inner: Arc<InMemoryExtensionStore>) -> Self {
        Self {
            inner,
            fixed_lookups: AtomicUsize::new(0),
            custom_lookups: AtomicUsize::new(0),
            stale_custom_lookups: false,
        }
    }

    /// Custom point lookups always miss, as they do for two adds of the same
    /// token that both read before either writes.
    pub fn with_stale_custom_lookups(mut self) -> Self {
        self.stale_custom_lookups = true;
        self
    }

    pub fn fixed_lookups(&self) -> usize {
        self.fixed_lookups.load(Ordering::SeqCst)
    }

    pub fn custom_lookups(&self) -> usize {
        self.custom_lookups.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.fixed_lookups() + self.custom_lookups()
    }
}

#[async_trait]
impl ExtensionPolicyStore for CountingStore {
    async fn find_fixed_extension(
        &self,
        extension: &str,
    ) -> Result<Option<FixedExtensionSetting>, AppError> {
        self.fixed_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_fixed_extension(extension).await
    }

    async fn list_fixed_extensions(&self) -> Result<Vec<FixedExtensionSetting>, AppError> {
        self.inner.list_fixed_extensions().await
    }

    async fn save_fixed_setting(
        &self,
        extension: &str,
        is_blocked: bool,
    ) -> Result<Option<FixedExtensionSetting>, AppError> {
        self.inner.save_fixed_setting(extension, is_blocked).await
    }

    async fn seed_fixed_extensions(&self, defaults: &[(String, bool)]) -> Result<u64, AppError> {
        self.inner.seed_fixed_extensions(defaults).await
    }

    async fn find_custom_extension(
        &self,
        extension: &str,
    ) -> Result<Option<CustomExtension>, AppError> {
        self.custom_lookups.fetch_add(1, Ordering::SeqCst);
        if self.stale_custom_lookups {
            return Ok(None);
        }
        self.inner.find_custom_extension(extension).await
    }

    async fn find_custom_extension_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<CustomExtension>, AppError> {
        self.inner.find_custom_extension_by_id(id).await
    }

    async fn list_custom_extensions(&self) -> Result<Vec<CustomExtension>, AppError> {
        self.inner.list_custom_extensions().await
    }

    async fn count_custom_extensions(&self) -> Result<i64, AppError> {
        self.inner.count_custom_extensions().await
    }

    async fn save_custom_extension(&self, extension: &str) -> Result<CustomExtension, AppError> {
        self.inner.save_custom_extension(extension).await
    }

    async fn delete_custom_extension(&self, id: Uuid) -> Result<bool, AppError> {
        self.inner.delete_custom_extension(id).await
    }
}
