//! extgate Storage Library
//!
//! Blob storage for uploaded files. Provides the `Storage` trait plus a local
//! filesystem backend and an in-memory backend.
//!
//! # Storage key format
//!
//! Every upload is written under `uploads/{uuid}.{extension}`, or `uploads/{uuid}`
//! when the original name has no extension. Keys must not contain `..` or a
//! leading `/`. Key generation lives in the `keys` module so all backends stay
//! consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use extgate_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{generate_storage_key, stored_filename};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageError, StorageResult};
