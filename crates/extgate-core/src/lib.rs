//! extgate Core Library
//!
//! This crate provides domain models, error types, configuration and the
//! extension parsing primitives shared by all extgate components.

pub mod config;
pub mod constants;
pub mod error;
pub mod extension;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, GatekeeperConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use extension::{extract_candidate_extensions, final_extension, normalize_extension};
pub use storage_types::{StorageBackend, StoreBackend};
