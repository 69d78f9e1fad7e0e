//! extgate Services Library
//!
//! Extension policy engine, upload validation, uploaded-file lifecycle,
//! policy-driven cleanup and the audit sink.

pub mod audit;
pub mod cleanup;
pub mod file_storage;
pub mod policy;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use audit::{AuditService, RequestContext};
pub use cleanup::{CleanupSummary, FileCleanupService};
pub use file_storage::FileStorageService;
pub use policy::{
    BlockedExtensionHook, ExtensionPolicyService, FixedExtensionStates, NoOpBlockedExtensionHook,
};
pub use validation::{FileValidationService, IncomingFile, ValidationError};

// Re-export storage types for convenience
pub use extgate_storage::{Storage, StorageBackend, StorageError, StorageResult};
