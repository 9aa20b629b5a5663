//! Auth collaborator contract

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use qrgen_core::{Identity, Profile};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Credentials or sign-up data rejected by the provider
    #[error("{0}")]
    Rejected(String),

    /// Provider could not be reached
    #[error("Auth provider unavailable: {0}")]
    Unavailable(String),
}

/// Called with the new identity (or `None` on sign-out)
pub type IdentityListener = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError>;

    /// Subscribe to identity changes until the handle is dropped
    fn on_identity_change(&self, listener: IdentityListener) -> ListenerHandle;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &Profile,
    ) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

type ListenerMap = Mutex<HashMap<u64, IdentityListener>>;

/// Listener bookkeeping shared by the provider implementations
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Arc<ListenerMap>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn subscribe(&self, listener: IdentityListener) -> ListenerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.insert(id, listener);
        }
        ListenerHandle {
            id,
            registry: Arc::downgrade(&self.listeners),
        }
    }

    pub fn notify(&self, identity: Option<Identity>) {
        // call outside the lock so listeners may subscribe or drop handles
        let listeners: Vec<IdentityListener> = match self.listeners.lock() {
            Ok(listeners) => listeners.values().cloned().collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(identity.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unsubscribes its listener when dropped
pub struct ListenerHandle {
    id: u64,
    registry: Weak<ListenerMap>,
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut listeners) = registry.lock() {
                listeners.remove(&self.id);
            }
        }
    }
}
