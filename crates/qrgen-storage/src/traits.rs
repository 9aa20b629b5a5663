//! Code store abstraction trait

use crate::StoreBackend;
use async_trait::async_trait;
use qrgen_core::{NewCodeRecord, SavedCodeRecord, Symbology};
use thiserror::Error;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Record has no owner; remote rows are scoped by user")]
    MissingOwner,

    #[error("Store backend error: {0}")]
    BackendError(String),

    #[error("Operation not supported by the {backend} store: {operation}")]
    Unsupported {
        backend: StoreBackend,
        operation: &'static str,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Saved-code persistence
///
/// `owner` is the signed-in identity's id. The local store has no notion of
/// users and ignores it; the remote store scopes every call by it.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Records for `owner`, newest first
    async fn list(&self, owner: Option<&str>) -> StoreResult<Vec<SavedCodeRecord>>;

    /// The record with the same owner, text and symbology, if any
    async fn find(
        &self,
        owner: Option<&str>,
        source_text: &str,
        symbology: Symbology,
    ) -> StoreResult<Option<SavedCodeRecord>>;

    /// Store a record; the backend assigns `id` and `created_at`
    async fn insert(&self, record: NewCodeRecord) -> StoreResult<SavedCodeRecord>;

    /// Delete by id. Unknown ids are not an error.
    async fn delete(&self, owner: Option<&str>, id: &str) -> StoreResult<()>;

    /// Delete every record
    async fn clear(&self) -> StoreResult<()>;

    /// Get the store backend type
    fn backend_type(&self) -> StoreBackend;
}
