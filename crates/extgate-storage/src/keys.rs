//! Shared key generation for storage backends.
//!
//! Key format: `uploads/{id}.{extension}`, or `uploads/{id}` without an extension.

use extgate_core::constants::UPLOAD_KEY_PREFIX;
use uuid::Uuid;

/// Name a blob is stored under: the file id plus its extension.
pub fn stored_filename(id: Uuid, extension: &str) -> String {
    if extension.is_empty() {
        id.to_string()
    } else {
        format!("{}.{}", id, extension)
    }
}

/// Generate the storage key for a file id and its normalized extension.
pub fn generate_storage_key(id: Uuid, extension: &str) -> String {
    format!("{}/{}", UPLOAD_KEY_PREFIX, stored_filename(id, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let id = Uuid::new_v4();
        assert_eq!(generate_storage_key(id, "pdf"), format!("uploads/{}.pdf", id));
        assert_eq!(generate_storage_key(id, ""), format!("uploads/{}", id));
    }
}
