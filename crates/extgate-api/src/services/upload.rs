//! Upload flow: validate, then store or reject, and audit the decision.
//!
//! Keeps the multipart handlers thin and lets the flow be exercised without
//! building requests by hand.

use axum::extract::Multipart;
use axum::http::HeaderMap;
use extgate_core::models::{
    UploadBlockedResponse, UploadCheckResponse, UploadResponse, ValidationVerdict,
};
use extgate_core::AppError;
use extgate_services::{IncomingFile, RequestContext};

use crate::state::AppState;

/// Outcome of an upload that passed structural validation.
pub enum UploadOutcome {
    Stored(UploadResponse),
    Blocked(UploadBlockedResponse),
}

/// Read the single `file` part of a multipart body.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<IncomingFile, AppError> {
    let mut file: Option<IncomingFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if file.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        file = Some(IncomingFile {
            filename,
            content_type,
            data,
        });
    }

    file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))
}

/// Client address and agent taken from proxy headers, when present.
pub fn request_context(headers: &HeaderMap) -> RequestContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let client_ip = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .or_else(|| header("x-real-ip"))
        .map(str::to_string);

    RequestContext {
        client_ip,
        user_agent: header("user-agent").map(str::to_string),
    }
}

pub struct UploadService<'a> {
    state: &'a AppState,
}

impl<'a> UploadService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Validate and, when allowed, store the file. Structural failures are
    /// returned as errors; a policy block is a regular outcome.
    pub async fn upload_file(
        &self,
        file: IncomingFile,
        ctx: &RequestContext,
    ) -> Result<UploadOutcome, AppError> {
        let filename = file.filename().unwrap_or_default().to_string();
        self.state
            .audit
            .log_upload_attempt(&filename, file.size(), ctx);

        let verdict = match self.state.validation.validate_file(&file).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::info!(error = %e, filename = %filename, "Upload rejected");
                return Err(e.into());
            }
        };

        match verdict {
            ValidationVerdict::Blocked {
                ref reason,
                kind,
                ref extension,
            } => {
                self.state
                    .audit
                    .log_blocked_upload(&filename, file.size(), &verdict, ctx)
                    .await;
                Ok(UploadOutcome::Blocked(UploadBlockedResponse {
                    error: reason.clone(),
                    file_name: filename,
                    block_reason: kind,
                    blocked_extension: extension.clone(),
                }))
            }
            ValidationVerdict::Allowed => {
                let size = file.size();
                let stored = self
                    .state
                    .files
                    .store_file(&filename, file.content_type.as_deref(), file.data)
                    .await?;
                self.state
                    .audit
                    .log_successful_upload(&filename, size, ctx)
                    .await;

                Ok(UploadOutcome::Stored(UploadResponse {
                    success: true,
                    message: "File uploaded successfully".to_string(),
                    file_id: stored.id,
                    original_file_name: stored.original_filename,
                    file_size: stored.file_size,
                }))
            }
        }
    }

    /// Validate only; nothing is stored. The decision is still audited.
    pub async fn check_file(
        &self,
        file: IncomingFile,
        ctx: &RequestContext,
    ) -> Result<UploadCheckResponse, AppError> {
        let verdict = self.state.validation.validate_file(&file).await?;
        let filename = file.filename().unwrap_or_default().to_string();
        let file_size = file.size();

        self.state
            .audit
            .log_verdict(&filename, file_size, &verdict, ctx)
            .await;

        Ok(match verdict {
            ValidationVerdict::Allowed => UploadCheckResponse {
                result: "allowed".to_string(),
                message: "File can be uploaded".to_string(),
                file_name: filename,
                file_size: file_size as i64,
                block_reason: None,
                blocked_extension: None,
            },
            ValidationVerdict::Blocked {
                reason,
                kind,
                extension,
            } => UploadCheckResponse {
                result: "blocked".to_string(),
                message: reason,
                file_name: filename,
                file_size: file_size as i64,
                block_reason: Some(kind),
                blocked_extension: Some(extension),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_context_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let ctx = request_context(&headers);
        assert_eq!(ctx.client_ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(ctx.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn test_request_context_without_headers() {
        let ctx = request_context(&HeaderMap::new());
        assert!(ctx.client_ip.is_none());
        assert!(ctx.user_agent.is_none());
    }
}
