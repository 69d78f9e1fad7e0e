use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Why an upload was rejected by policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "block_reason", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockReason {
    BlockedExtension,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::BlockedExtension => "BLOCKED_EXTENSION",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one file against the current policy.
///
/// Produced per request and never persisted. Structural problems (empty file,
/// missing name, oversize) are errors, not verdicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    Allowed,
    Blocked {
        reason: String,
        kind: BlockReason,
        extension: String,
    },
}

impl ValidationVerdict {
    /// Verdict for a filename rejected because of `extension`.
    pub fn blocked_extension(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        ValidationVerdict::Blocked {
            reason: format!("Blocked extension: {}", extension),
            kind: BlockReason::BlockedExtension,
            extension,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, ValidationVerdict::Allowed)
    }

    pub fn is_blocked(&self) -> bool {
        !self.is_allowed()
    }

    pub fn blocked_extension_token(&self) -> Option<&str> {
        match self {
            ValidationVerdict::Allowed => None,
            ValidationVerdict::Blocked { extension, .. } => Some(extension),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_verdict_embeds_extension() {
        let verdict = ValidationVerdict::blocked_extension("exe");
        match &verdict {
            ValidationVerdict::Blocked {
                reason,
                kind,
                extension,
            } => {
                assert_eq!(reason, "Blocked extension: exe");
                assert_eq!(*kind, BlockReason::BlockedExtension);
                assert_eq!(extension, "exe");
            }
            ValidationVerdict::Allowed => panic!("expected blocked verdict"),
        }
        assert!(verdict.is_blocked());
        assert_eq!(verdict.blocked_extension_token(), Some("exe"));
    }

    #[test]
    fn test_block_reason_wire_format() {
        let json = serde_json::to_string(&BlockReason::BlockedExtension).unwrap();
        assert_eq!(json, "\"BLOCKED_EXTENSION\"");
        assert_eq!(BlockReason::BlockedExtension.to_string(), "BLOCKED_EXTENSION");
    }
}
