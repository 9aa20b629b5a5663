//! Persistence gateway
//!
//! Saves, lists and deletes codes for the current identity over whichever
//! [`CodeStore`] it was built with, and keeps an in-memory view of the list.
//! The view belongs to the owner it was loaded for and reads as empty for
//! anyone else. A failed backend call leaves the view untouched.

use std::sync::Arc;

use qrgen_core::{CodeError, CodeResult, GeneratedCode, NewCodeRecord, SavedCodeRecord};
use qrgen_storage::{CodeStore, StoreBackend, StoreError};
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::identity::IdentityContext;

pub const CLEAR_ALL_PROMPT: &str =
    "Are you sure you want to delete all saved codes? This cannot be undone.";

pub const SAVED_MESSAGE: &str = "Code saved";
pub const DELETED_MESSAGE: &str = "Code deleted";
pub const CLEARED_MESSAGE: &str = "All saved codes deleted";

/// Yes/no confirmation asked before destructive operations
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

fn map_store_error(err: StoreError) -> CodeError {
    match err {
        StoreError::MissingOwner => CodeError::NotAuthenticated,
        StoreError::Unsupported { backend, operation } => {
            CodeError::Unsupported(format!("{} is not available for {} storage", operation, backend))
        }
        other => {
            tracing::warn!(error = %other, "Store call failed");
            CodeError::StorageUnavailable(other.to_string())
        }
    }
}

#[derive(Default)]
struct ListView {
    owner: Option<String>,
    records: Vec<SavedCodeRecord>,
}

pub struct PersistenceGateway {
    store: Arc<dyn CodeStore>,
    identity: Arc<IdentityContext>,
    view: RwLock<ListView>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn CodeStore>, identity: Arc<IdentityContext>) -> Self {
        Self {
            store,
            identity,
            view: RwLock::new(ListView::default()),
        }
    }

    pub fn backend(&self) -> StoreBackend {
        self.store.backend_type()
    }

    /// Last known list for the current identity, newest first
    pub async fn view(&self) -> Vec<SavedCodeRecord> {
        let owner = self.current_owner();
        let view = self.view.read().await;
        if view.owner == owner {
            view.records.clone()
        } else {
            Vec::new()
        }
    }

    fn current_owner(&self) -> Option<String> {
        if !self.backend().requires_identity() {
            return None;
        }
        self.identity.current().map(|identity| identity.id)
    }

    /// Write access to the view, emptied first if it was loaded for
    /// another owner
    async fn view_for(&self, owner: &Option<String>) -> RwLockWriteGuard<'_, ListView> {
        let mut view = self.view.write().await;
        if view.owner != *owner {
            tracing::debug!("Identity changed, discarding list view");
            view.owner = owner.clone();
            view.records.clear();
        }
        view
    }

    /// Owner to scope calls by. Remote needs a signed-in identity; local
    /// records have no owner.
    async fn owner(&self) -> CodeResult<Option<String>> {
        if !self.backend().requires_identity() {
            return Ok(None);
        }
        match self.identity.resolve().await {
            Some(identity) => Ok(Some(identity.id)),
            None => Err(CodeError::NotAuthenticated),
        }
    }

    pub async fn save(&self, code: &GeneratedCode) -> CodeResult<SavedCodeRecord> {
        let owner = self.owner().await?;

        let existing = self
            .store
            .find(owner.as_deref(), &code.source_text, code.symbology)
            .await
            .map_err(map_store_error)?;
        if existing.is_some() {
            tracing::debug!(symbology = %code.symbology, "Code already saved");
            return Err(CodeError::DuplicateRecord {
                text: code.source_text.clone(),
                symbology: code.symbology,
            });
        }

        let record = self
            .store
            .insert(NewCodeRecord::from_generated(code, owner.clone()))
            .await
            .map_err(map_store_error)?;

        self.view_for(&owner).await.records.insert(0, record.clone());
        tracing::info!(id = %record.id, symbology = %record.symbology, backend = %self.backend(), "Code saved");
        Ok(record)
    }

    pub async fn list(&self) -> CodeResult<Vec<SavedCodeRecord>> {
        let owner = self.owner().await?;
        let records = self
            .store
            .list(owner.as_deref())
            .await
            .map_err(map_store_error)?;
        self.view_for(&owner).await.records = records.clone();
        Ok(records)
    }

    /// Unknown ids succeed without changing anything
    pub async fn delete(&self, id: &str) -> CodeResult<()> {
        let owner = self.owner().await?;
        self.store
            .delete(owner.as_deref(), id)
            .await
            .map_err(map_store_error)?;
        self.view_for(&owner).await.records.retain(|r| r.id != id);
        Ok(())
    }

    /// Delete everything after confirmation. Returns whether anything was
    /// attempted; a declined prompt is `Ok(false)`.
    pub async fn clear_all(&self, prompt: &dyn ConfirmPrompt) -> CodeResult<bool> {
        if self.backend() == StoreBackend::Remote {
            return Err(CodeError::Unsupported(
                "Clearing all codes is only available for local storage".to_string(),
            ));
        }
        if !prompt.confirm(CLEAR_ALL_PROMPT) {
            tracing::debug!("Clear all declined");
            return Ok(false);
        }
        self.store.clear().await.map_err(map_store_error)?;
        self.view_for(&None).await.records.clear();
        tracing::info!("Cleared all saved codes");
        Ok(true)
    }
}

/// User-facing message for a save result
pub fn save_message(result: &CodeResult<SavedCodeRecord>) -> String {
    match result {
        Ok(_) => SAVED_MESSAGE.to_string(),
        Err(err) => qrgen_core::ErrorMetadata::client_message(err),
    }
}
