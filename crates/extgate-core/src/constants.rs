//! Application-wide constants

/// Hard cap on the number of custom extensions.
pub const MAX_CUSTOM_EXTENSIONS: i64 = 200;

/// Longest accepted custom extension token, after normalization.
pub const MAX_EXTENSION_LENGTH: usize = 20;

/// Default upload size ceiling (100 MiB).
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 100;

/// Fixed vocabulary seeded when `FIXED_EXTENSIONS` is not set.
pub const DEFAULT_FIXED_EXTENSIONS: &str = "bat,cmd,com,cpl,exe,scr,js";

/// Fixed extensions seeded as blocked when `FIXED_EXTENSIONS_BLOCKED` is not set.
pub const DEFAULT_FIXED_EXTENSIONS_BLOCKED: &str = "exe";

/// Prefix of every storage key written for an upload.
pub const UPLOAD_KEY_PREFIX: &str = "uploads";
