//! Upload validation
//!
//! Structural checks (content present, name present, size under the ceiling)
//! run first and fail as errors. Only a structurally valid file reaches the
//! extension policy, whose outcome is a [`ValidationVerdict`], not an error.

use bytes::Bytes;
use extgate_core::models::ValidationVerdict;
use extgate_core::AppError;

use crate::policy::ExtensionPolicyService;

/// A file as received from the client, before anything is stored.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: Some(filename.into()),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Filename with surrounding whitespace removed, `None` when blank.
    pub fn filename(&self) -> Option<&str> {
        self.filename
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File is empty")]
    EmptyFile,

    #[error("File name is missing")]
    MissingFilename,

    #[error("File size {size} bytes exceeds the maximum of {max} bytes")]
    FileTooLarge { size: usize, max: usize },

    /// The policy store could not be consulted.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyFile | ValidationError::MissingFilename => {
                AppError::InvalidInput(err.to_string())
            }
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::Store(inner) => inner,
        }
    }
}

#[derive(Clone)]
pub struct FileValidationService {
    policy: ExtensionPolicyService,
    max_file_size_bytes: usize,
}

impl FileValidationService {
    pub fn new(policy: ExtensionPolicyService, max_file_size_bytes: usize) -> Self {
        Self {
            policy,
            max_file_size_bytes,
        }
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_bytes
    }

    #[tracing::instrument(
        skip(self, file),
        fields(
            upload.filename = file.filename.as_deref().unwrap_or(""),
            upload.size = file.size()
        )
    )]
    pub async fn validate_file(
        &self,
        file: &IncomingFile,
    ) -> Result<ValidationVerdict, ValidationError> {
        if file.data.is_empty() {
            return Err(ValidationError::EmptyFile);
        }

        let filename = file.filename().ok_or(ValidationError::MissingFilename)?;

        if file.size() > self.max_file_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size: file.size(),
                max: self.max_file_size_bytes,
            });
        }

        match self.policy.find_blocked_extension(filename, None).await? {
            Some(extension) => {
                tracing::info!(
                    filename = %filename,
                    extension = %extension,
                    "Upload blocked by extension policy"
                );
                Ok(ValidationVerdict::blocked_extension(extension))
            }
            None => Ok(ValidationVerdict::Allowed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::NoOpBlockedExtensionHook;
    use crate::test_support::seeded_store;
    use extgate_core::models::BlockReason;
    use std::sync::Arc;

    const MIB: usize = 1024 * 1024;

    async fn validator(max: usize) -> FileValidationService {
        let store = seeded_store(&[("exe", true), ("bat", false)]).await;
        let policy = ExtensionPolicyService::new(store, Arc::new(NoOpBlockedExtensionHook));
        FileValidationService::new(policy, max)
    }

    fn reason_of(verdict: &ValidationVerdict) -> &str {
        match verdict {
            ValidationVerdict::Blocked { reason, .. } => reason,
            ValidationVerdict::Allowed => panic!("expected a blocked verdict"),
        }
    }

    #[tokio::test]
    async fn test_empty_file_is_invalid_input() {
        let service = validator(100 * MIB).await;
        let err = service
            .validate_file(&IncomingFile::new("a.txt", Bytes::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyFile));
        assert!(matches!(AppError::from(err), AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_or_blank_name_is_invalid_input() {
        let service = validator(100 * MIB).await;

        let nameless = IncomingFile {
            filename: None,
            content_type: None,
            data: Bytes::from_static(b"x"),
        };
        assert!(matches!(
            service.validate_file(&nameless).await,
            Err(ValidationError::MissingFilename)
        ));

        let blank = IncomingFile::new("   ", Bytes::from_static(b"x"));
        let err = service.validate_file(&blank).await.unwrap_err();
        assert!(matches!(err, ValidationError::MissingFilename));
        assert!(matches!(AppError::from(err), AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_empty_check_runs_before_name_check() {
        let service = validator(100 * MIB).await;
        let file = IncomingFile {
            filename: None,
            content_type: None,
            data: Bytes::new(),
        };
        assert!(matches!(
            service.validate_file(&file).await,
            Err(ValidationError::EmptyFile)
        ));
    }

    #[tokio::test]
    async fn test_size_ceiling_is_inclusive() {
        let service = validator(8).await;

        let at_limit = IncomingFile::new("a.txt", vec![0u8; 8]);
        assert!(service.validate_file(&at_limit).await.unwrap().is_allowed());

        let over = IncomingFile::new("a.txt", vec![0u8; 9]);
        let err = service.validate_file(&over).await.unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { size: 9, max: 8 }));
        assert!(matches!(AppError::from(err), AppError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn test_oversized_blocked_file_fails_structurally() {
        let service = validator(4).await;
        let file = IncomingFile::new("malware.exe", vec![0u8; 5]);
        assert!(matches!(
            service.validate_file(&file).await,
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_bypass_attempt_is_blocked() {
        let service = validator(100 * MIB).await;
        let verdict = service
            .validate_file(&IncomingFile::new("document.pdf.exe", b"MZ".to_vec()))
            .await
            .unwrap();
        assert_eq!(
            verdict,
            ValidationVerdict::Blocked {
                reason: "Blocked extension: exe".to_string(),
                kind: BlockReason::BlockedExtension,
                extension: "exe".to_string(),
            }
        );

        let verdict = service
            .validate_file(&IncomingFile::new("setup.exe.txt", b"MZ".to_vec()))
            .await
            .unwrap();
        assert_eq!(verdict.blocked_extension_token(), Some("exe"));
    }

    #[tokio::test]
    async fn test_name_without_extension_is_allowed() {
        let service = validator(100 * MIB).await;
        let verdict = service
            .validate_file(&IncomingFile::new("README", b"hello".to_vec()))
            .await
            .unwrap();
        assert!(verdict.is_allowed());
    }

    #[tokio::test]
    async fn test_end_to_end_policy_lifecycle() {
        let store = seeded_store(&[("exe", true), ("bat", false)]).await;
        let policy = ExtensionPolicyService::new(store, Arc::new(NoOpBlockedExtensionHook));
        let service = FileValidationService::new(policy.clone(), 100 * MIB);
        let body = b"content".to_vec();

        let verdict = service
            .validate_file(&IncomingFile::new("malware.exe", body.clone()))
            .await
            .unwrap();
        assert!(reason_of(&verdict).contains("exe"));

        let verdict = service
            .validate_file(&IncomingFile::new("script.bat", body.clone()))
            .await
            .unwrap();
        assert!(verdict.is_allowed());

        let custom = policy.add_custom_extension("virus").await.unwrap();
        let verdict = service
            .validate_file(&IncomingFile::new("x.virus", body.clone()))
            .await
            .unwrap();
        assert!(reason_of(&verdict).contains("virus"));

        policy.delete_custom_extension(custom.id).await.unwrap();
        let verdict = service
            .validate_file(&IncomingFile::new("x.virus", body))
            .await
            .unwrap();
        assert!(verdict.is_allowed());
    }
}
