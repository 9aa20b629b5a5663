//! Error types module
//!
//! Every failure the generator, the persistence gateway or the identity
//! context can report is a [`CodeError`]. Variants describe themselves through
//! [`ErrorMetadata`] so that the HTTP and CLI surfaces can present them
//! without matching on each case.

use crate::models::Symbology;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like an unreachable backend
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "BLANK_OUTPUT")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("Input text cannot be empty")]
    EmptyInput,

    #[error("Unsupported symbology: {0}")]
    UnsupportedSymbology(String),

    #[error("Failed to generate {}: {cause}", .symbology.label())]
    Render { symbology: Symbology, cause: String },

    #[error("Failed to generate {symbology}. Input may be invalid for this format.")]
    BlankOutput { symbology: Symbology },

    #[error("You must be logged in to save codes")]
    NotAuthenticated,

    #[error("Code already saved: {symbology} for \"{text}\"")]
    DuplicateRecord { text: String, symbology: Symbology },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Sharing is not supported on this device")]
    ShareUnsupported,

    #[error("Share aborted")]
    ShareAborted,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CodeResult<T> = Result<T, CodeError>;

impl From<std::io::Error> for CodeError {
    fn from(err: std::io::Error) -> Self {
        CodeError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for CodeError {
    fn from(err: serde_json::Error) -> Self {
        CodeError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn code_error_static_metadata(
    err: &CodeError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        CodeError::EmptyInput => (
            400,
            "EMPTY_INPUT",
            false,
            Some("Enter some text or a URL"),
            false,
            LogLevel::Debug,
        ),
        CodeError::UnsupportedSymbology(_) => (
            400,
            "UNSUPPORTED_SYMBOLOGY",
            false,
            Some("Pick one of the supported code types"),
            false,
            LogLevel::Debug,
        ),
        CodeError::Render { .. } => (
            500,
            "RENDER_FAILED",
            false,
            Some("Shorten the input or pick another code type"),
            false,
            LogLevel::Warn,
        ),
        CodeError::BlankOutput { .. } => (
            400,
            "BLANK_OUTPUT",
            false,
            Some("Check that the input is valid for this code type"),
            false,
            LogLevel::Debug,
        ),
        CodeError::NotAuthenticated => (
            401,
            "NOT_AUTHENTICATED",
            false,
            Some("Sign in and try again"),
            false,
            LogLevel::Debug,
        ),
        CodeError::DuplicateRecord { .. } => (
            409,
            "DUPLICATE_RECORD",
            false,
            None,
            false,
            LogLevel::Debug,
        ),
        CodeError::StorageUnavailable(_) => (
            503,
            "STORAGE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Warn,
        ),
        CodeError::ShareUnsupported => (
            501,
            "SHARE_UNSUPPORTED",
            false,
            Some("Download the image instead"),
            false,
            LogLevel::Debug,
        ),
        CodeError::ShareAborted => (499, "SHARE_ABORTED", true, None, false, LogLevel::Debug),
        CodeError::AuthFailed(_) => (
            401,
            "AUTH_FAILED",
            false,
            Some("Check email and password"),
            false,
            LogLevel::Debug,
        ),
        CodeError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        CodeError::Unsupported(_) => (
            405,
            "UNSUPPORTED_OPERATION",
            false,
            None,
            false,
            LogLevel::Debug,
        ),
        CodeError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl CodeError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            CodeError::EmptyInput => "EmptyInput",
            CodeError::UnsupportedSymbology(_) => "UnsupportedSymbology",
            CodeError::Render { .. } => "Render",
            CodeError::BlankOutput { .. } => "BlankOutput",
            CodeError::NotAuthenticated => "NotAuthenticated",
            CodeError::DuplicateRecord { .. } => "DuplicateRecord",
            CodeError::StorageUnavailable(_) => "StorageUnavailable",
            CodeError::ShareUnsupported => "ShareUnsupported",
            CodeError::ShareAborted => "ShareAborted",
            CodeError::AuthFailed(_) => "AuthFailed",
            CodeError::InvalidInput(_) => "InvalidInput",
            CodeError::Unsupported(_) => "Unsupported",
            CodeError::Internal(_) => "Internal",
        }
    }

    /// Whether the user should see this at all. Aborted shares are silent.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, CodeError::ShareAborted)
    }
}

impl ErrorMetadata for CodeError {
    fn http_status_code(&self) -> u16 {
        code_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        code_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        code_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        code_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        code_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        code_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            CodeError::DuplicateRecord { .. } => "Code already saved".to_string(),
            CodeError::StorageUnavailable(_) => "Failed to reach storage".to_string(),
            CodeError::ShareUnsupported => {
                "Sharing is not supported in this browser or no code generated yet.".to_string()
            }
            CodeError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_blank_output() {
        let err = CodeError::BlankOutput {
            symbology: Symbology::Ean13,
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "BLANK_OUTPUT");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("EAN13"));
    }

    #[test]
    fn test_render_message_names_symbology_and_cause() {
        let err = CodeError::Render {
            symbology: Symbology::Qr,
            cause: "data too long".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to generate QR Code: data too long");
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn test_error_metadata_storage_unavailable_is_sensitive() {
        let err = CodeError::StorageUnavailable("connection refused".to_string());
        assert_eq!(err.http_status_code(), 503);
        assert!(err.is_recoverable());
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(!err.client_message().contains("connection refused"));
    }

    #[test]
    fn test_duplicate_client_message() {
        let err = CodeError::DuplicateRecord {
            text: "hello".to_string(),
            symbology: Symbology::Qr,
        };
        assert_eq!(err.client_message(), "Code already saved");
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_not_authenticated_message() {
        assert_eq!(
            CodeError::NotAuthenticated.client_message(),
            "You must be logged in to save codes"
        );
    }

    #[test]
    fn test_share_aborted_is_silent() {
        assert!(!CodeError::ShareAborted.is_user_visible());
        assert!(CodeError::ShareUnsupported.is_user_visible());
    }

    #[test]
    fn test_error_type_names() {
        assert_eq!(CodeError::EmptyInput.error_type(), "EmptyInput");
        assert_eq!(
            CodeError::Unsupported("clear".to_string()).error_type(),
            "Unsupported"
        );
    }
}
