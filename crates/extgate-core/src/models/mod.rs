//! Data models for the application
//!
//! Policy state (fixed and custom extensions), uploaded-file metadata, audit
//! entries and the transient validation verdict.

mod audit;
mod extension;
mod uploaded_file;
mod verdict;

pub use audit::*;
pub use extension::*;
pub use uploaded_file::*;
pub use verdict::*;
