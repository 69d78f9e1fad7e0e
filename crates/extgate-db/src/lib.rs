//! extgate Database Layer
//!
//! Store traits consumed by the policy engine and the upload services, with
//! Postgres repositories and in-memory implementations behind them.

pub mod db;
pub mod memory;
pub mod traits;

// Re-exports: Postgres repositories
pub use db::{AuditLogRepository, ExtensionRepository, UploadedFileRepository};

// Re-exports: In-memory stores
pub use memory::{InMemoryAuditLogStore, InMemoryExtensionStore, InMemoryUploadedFileStore};

// Re-exports: Store traits
pub use traits::{AuditLogStore, ExtensionPolicyStore, UploadedFileStore};
