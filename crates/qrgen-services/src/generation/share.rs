//! Capability-gated sharing of a generated code

use async_trait::async_trait;
use qrgen_core::{CodeError, ErrorMetadata, GeneratedCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl SharePayload {
    pub fn for_code(code: &GeneratedCode) -> Self {
        Self {
            title: format!("Generated {}", code.symbology),
            text: format!("Code generated for: {}", code.source_text),
            file_name: format!("generated_{}.png", code.symbology),
            content_type: "image/png",
            bytes: code.png.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    /// The user dismissed the share sheet
    #[error("Share aborted")]
    Aborted,

    #[error("{0}")]
    Failed(String),
}

/// Something that can share files, such as a platform share sheet
#[async_trait]
pub trait ShareTarget: Send + Sync {
    fn is_available(&self) -> bool;

    async fn share(&self, payload: SharePayload) -> Result<(), ShareError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// Non-fatal notice: no share capability or nothing to share
    Unsupported { notice: String },
    /// User aborted; nothing is shown
    Aborted,
    Failed { message: String },
}

impl ShareOutcome {
    /// Text to show the user, if any
    pub fn notice(&self) -> Option<&str> {
        match self {
            ShareOutcome::Unsupported { notice } => Some(notice),
            ShareOutcome::Failed { message } => Some(message),
            ShareOutcome::Shared | ShareOutcome::Aborted => None,
        }
    }
}

pub async fn share(code: Option<&GeneratedCode>, target: &dyn ShareTarget) -> ShareOutcome {
    let code = match code {
        Some(code) if target.is_available() => code,
        _ => {
            return ShareOutcome::Unsupported {
                notice: CodeError::ShareUnsupported.client_message(),
            }
        }
    };

    match target.share(SharePayload::for_code(code)).await {
        Ok(()) => {
            tracing::info!(symbology = %code.symbology, "Code shared");
            ShareOutcome::Shared
        }
        Err(ShareError::Aborted) => {
            tracing::debug!("Share aborted by user");
            ShareOutcome::Aborted
        }
        Err(ShareError::Failed(message)) => {
            tracing::warn!(%message, "Share failed");
            ShareOutcome::Failed { message }
        }
    }
}
