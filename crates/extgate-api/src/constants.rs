//! API constants

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

/// Current API version segment
pub const API_VERSION: &str = "v0";

/// Versioned prefix every route is mounted under
pub const API_PREFIX: &str = "/api/v0";

/// Extra room on top of the file ceiling for multipart framing, so an
/// oversized file reaches validation instead of being cut off mid-stream.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
