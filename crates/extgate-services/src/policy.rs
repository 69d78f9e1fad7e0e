//! Extension policy engine
//!
//! Decides whether an extension token or a whole filename is blocked and owns
//! the mutations of policy state. A token is resolved in priority order:
//!
//! 1. fixed vocabulary: its `is_blocked` flag wins,
//! 2. custom list: presence means blocked,
//! 3. anything else is allowed.
//!
//! Filenames are checked token by token in the order produced by
//! [`extract_candidate_extensions`] (left to right); the first blocked token is
//! the one reported.

use async_trait::async_trait;
use extgate_core::constants::{MAX_CUSTOM_EXTENSIONS, MAX_EXTENSION_LENGTH};
use extgate_core::extension::{extract_candidate_extensions, normalize_extension};
use extgate_core::models::{BlockedExtensionsResponse, CustomExtension, FixedExtensionSetting};
use extgate_core::AppError;
use extgate_db::ExtensionPolicyStore;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Caller-supplied fixed-extension flags, keyed by extension. When passed to a
/// check it replaces the fixed lookup entirely.
pub type FixedExtensionStates = HashMap<String, bool>;

/// Invoked after an extension newly starts blocking uploads, once the policy
/// change is persisted. Implementations handle their own failures.
#[async_trait]
pub trait BlockedExtensionHook: Send + Sync {
    async fn on_extension_blocked(&self, extension: &str);
}

/// Hook that does nothing.
pub struct NoOpBlockedExtensionHook;

#[async_trait]
impl BlockedExtensionHook for NoOpBlockedExtensionHook {
    async fn on_extension_blocked(&self, _extension: &str) {}
}

#[derive(Clone)]
pub struct ExtensionPolicyService {
    store: Arc<dyn ExtensionPolicyStore>,
    on_blocked: Arc<dyn BlockedExtensionHook>,
}

impl ExtensionPolicyService {
    pub fn new(
        store: Arc<dyn ExtensionPolicyStore>,
        on_blocked: Arc<dyn BlockedExtensionHook>,
    ) -> Self {
        Self { store, on_blocked }
    }

    /// Whether a single extension token is blocked. Blank tokens are never blocked.
    pub async fn is_extension_blocked(
        &self,
        extension: &str,
        fixed_states: Option<&FixedExtensionStates>,
    ) -> Result<bool, AppError> {
        let token = normalize_extension(extension);
        if token.is_empty() {
            return Ok(false);
        }
        let states = fixed_states.map(normalize_states);
        self.is_token_blocked(&token, states.as_ref()).await
    }

    /// First blocked candidate extension of `filename`, if any.
    ///
    /// Filenames without candidates are allowed without touching the store.
    #[tracing::instrument(skip(self, fixed_states), fields(policy.filename = %filename))]
    pub async fn find_blocked_extension(
        &self,
        filename: &str,
        fixed_states: Option<&FixedExtensionStates>,
    ) -> Result<Option<String>, AppError> {
        let candidates = extract_candidate_extensions(filename);
        if candidates.is_empty() {
            return Ok(None);
        }

        let states = fixed_states.map(normalize_states);
        for token in candidates {
            if self.is_token_blocked(&token, states.as_ref()).await? {
                tracing::debug!(extension = %token, "Filename matched blocked extension");
                return Ok(Some(token));
            }
        }
        Ok(None)
    }

    pub async fn is_filename_blocked(
        &self,
        filename: &str,
        fixed_states: Option<&FixedExtensionStates>,
    ) -> Result<bool, AppError> {
        Ok(self
            .find_blocked_extension(filename, fixed_states)
            .await?
            .is_some())
    }

    async fn is_token_blocked(
        &self,
        token: &str,
        fixed_states: Option<&FixedExtensionStates>,
    ) -> Result<bool, AppError> {
        match fixed_states {
            Some(states) => {
                if let Some(blocked) = states.get(token) {
                    return Ok(*blocked);
                }
            }
            None => {
                if let Some(setting) = self.store.find_fixed_extension(token).await? {
                    return Ok(setting.is_blocked);
                }
            }
        }

        Ok(self.store.find_custom_extension(token).await?.is_some())
    }

    pub async fn list_fixed_extensions(&self) -> Result<Vec<FixedExtensionSetting>, AppError> {
        self.store.list_fixed_extensions().await
    }

    /// Toggle a fixed extension. A false to true transition runs the blocked
    /// hook after the new flag is persisted.
    #[tracing::instrument(skip(self), fields(policy.operation = "update_fixed"))]
    pub async fn update_fixed_extension(
        &self,
        extension: &str,
        is_blocked: bool,
    ) -> Result<FixedExtensionSetting, AppError> {
        let token = normalize_extension(extension);
        let not_found = || AppError::NotFound(format!("'{}' is not a fixed extension", token));

        let current = self
            .store
            .find_fixed_extension(&token)
            .await?
            .ok_or_else(not_found)?;

        let updated = self
            .store
            .save_fixed_setting(&token, is_blocked)
            .await?
            .ok_or_else(not_found)?;

        tracing::info!(
            extension = %token,
            was_blocked = current.is_blocked,
            is_blocked = updated.is_blocked,
            "Fixed extension setting updated"
        );

        if !current.is_blocked && updated.is_blocked {
            self.on_blocked.on_extension_blocked(&token).await;
        }

        Ok(updated)
    }

    pub async fn list_custom_extensions(&self) -> Result<Vec<CustomExtension>, AppError> {
        self.store.list_custom_extensions().await
    }

    /// Register a custom extension. Fails with `AlreadyExists` for a duplicate,
    /// `Conflict` for a fixed extension and `LimitExceeded` at the cap. Files
    /// already stored under the new extension are handed to the blocked hook.
    #[tracing::instrument(skip(self), fields(policy.operation = "add_custom"))]
    pub async fn add_custom_extension(&self, extension: &str) -> Result<CustomExtension, AppError> {
        let token = normalize_extension(extension);
        validate_custom_token(&token)?;

        if self.store.find_custom_extension(&token).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Custom extension '{}' already exists",
                token
            )));
        }

        if self.store.find_fixed_extension(&token).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "'{}' is a fixed extension; toggle it instead",
                token
            )));
        }

        let count = self.store.count_custom_extensions().await?;
        if count >= MAX_CUSTOM_EXTENSIONS {
            return Err(AppError::LimitExceeded {
                resource: "custom extensions".to_string(),
                used: count,
                limit: MAX_CUSTOM_EXTENSIONS,
            });
        }

        // A concurrent add of the same token surfaces here as AlreadyExists.
        let entry = self.store.save_custom_extension(&token).await?;

        tracing::info!(extension = %entry.extension, id = %entry.id, "Custom extension added");

        self.on_blocked.on_extension_blocked(&entry.extension).await;

        Ok(entry)
    }

    /// Remove a custom extension. Previously deleted files stay deleted.
    #[tracing::instrument(skip(self), fields(policy.operation = "delete_custom"))]
    pub async fn delete_custom_extension(&self, id: Uuid) -> Result<CustomExtension, AppError> {
        let not_found = || AppError::NotFound(format!("Custom extension {} not found", id));

        let entry = self
            .store
            .find_custom_extension_by_id(id)
            .await?
            .ok_or_else(not_found)?;

        if !self.store.delete_custom_extension(id).await? {
            return Err(not_found());
        }

        tracing::info!(extension = %entry.extension, id = %id, "Custom extension deleted");
        Ok(entry)
    }

    /// Every extension that currently blocks uploads: blocked fixed
    /// extensions first, then custom ones, each in store order.
    pub async fn blocked_extensions(&self) -> Result<Vec<String>, AppError> {
        Ok(self.blocked_extension_summary().await?.extensions)
    }

    /// Blocked extensions with per-source counts, all taken from the same
    /// listing of each table.
    pub async fn blocked_extension_summary(&self) -> Result<BlockedExtensionsResponse, AppError> {
        let fixed = self.store.list_fixed_extensions().await?;
        let custom = self.store.list_custom_extensions().await?;

        let mut extensions: Vec<String> = fixed
            .into_iter()
            .filter(|setting| setting.is_blocked)
            .map(|setting| setting.extension)
            .collect();
        let fixed_count = extensions.len();
        let custom_count = custom.len();
        extensions.extend(custom.into_iter().map(|entry| entry.extension));

        Ok(BlockedExtensionsResponse {
            extensions,
            fixed_count,
            custom_count,
        })
    }

    /// Create any fixed settings missing from the store. Tokens that already
    /// exist as custom extensions are skipped so the two sets stay disjoint.
    pub async fn seed_fixed_extensions(&self, defaults: &[(String, bool)]) -> Result<u64, AppError> {
        let mut seed = Vec::with_capacity(defaults.len());
        for (extension, is_blocked) in defaults {
            let token = normalize_extension(extension);
            if token.is_empty() {
                continue;
            }
            if self.store.find_custom_extension(&token).await?.is_some() {
                tracing::warn!(
                    extension = %token,
                    "Skipping fixed extension seed: already registered as custom"
                );
                continue;
            }
            seed.push((token, *is_blocked));
        }

        let inserted = self.store.seed_fixed_extensions(&seed).await?;
        tracing::info!(
            requested = seed.len(),
            inserted = inserted,
            "Fixed extensions seeded"
        );
        Ok(inserted)
    }
}

fn normalize_states(states: &FixedExtensionStates) -> FixedExtensionStates {
    states
        .iter()
        .map(|(extension, blocked)| (normalize_extension(extension), *blocked))
        .filter(|(extension, _)| !extension.is_empty())
        .collect()
}

fn validate_custom_token(token: &str) -> Result<(), AppError> {
    if token.is_empty() {
        return Err(AppError::InvalidInput(
            "Extension must not be empty".to_string(),
        ));
    }
    if token.chars().count() > MAX_EXTENSION_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Extension must be at most {} characters",
            MAX_EXTENSION_LENGTH
        )));
    }
    if !token.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::InvalidInput(format!(
            "Extension '{}' may only contain letters and digits",
            token
        )));
    }
    Ok(())
}
