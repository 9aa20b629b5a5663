use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use qrgen_core::{Identity, Profile};
use tokio::sync::Mutex;

use super::provider::{AuthError, AuthProvider, IdentityListener, ListenerHandle, ListenerRegistry};

struct Account {
    password: String,
    identity: Identity,
    profile: Profile,
}

/// In-process auth provider. Sign-up signs the new user in immediately.
#[derive(Default)]
pub struct MemoryAuthProvider {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<Identity>>,
    listeners: ListenerRegistry,
    unavailable: AtomicBool,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the provider were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Profile given at sign-up
    pub async fn profile(&self, email: &str) -> Option<Profile> {
        self.accounts
            .lock()
            .await
            .get(&email.to_lowercase())
            .map(|a| a.profile.clone())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::Unavailable("provider offline".to_string()));
        }
        Ok(())
    }

    async fn set_current(&self, identity: Option<Identity>) {
        *self.current.lock().await = identity.clone();
        self.listeners.notify(identity);
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        self.check_available()?;
        Ok(self.current.lock().await.clone())
    }

    fn on_identity_change(&self, listener: IdentityListener) -> ListenerHandle {
        self.listeners.subscribe(listener)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.check_available()?;
        let identity = {
            let accounts = self.accounts.lock().await;
            match accounts.get(&email.to_lowercase()) {
                Some(account) if account.password == password => account.identity.clone(),
                _ => return Err(AuthError::Rejected("Invalid login credentials".to_string())),
            }
        };
        self.set_current(Some(identity.clone())).await;
        Ok(identity)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &Profile,
    ) -> Result<Identity, AuthError> {
        self.check_available()?;
        if password.len() < 6 {
            return Err(AuthError::Rejected(
                "Password should be at least 6 characters".to_string(),
            ));
        }
        let key = email.to_lowercase();
        let identity = {
            let mut accounts = self.accounts.lock().await;
            if accounts.contains_key(&key) {
                return Err(AuthError::Rejected("User already registered".to_string()));
            }
            let identity = Identity {
                id: uuid::Uuid::new_v4().to_string(),
                email: Some(key.clone()),
            };
            accounts.insert(
                key,
                Account {
                    password: password.to_string(),
                    identity: identity.clone(),
                    profile: profile.clone(),
                },
            );
            identity
        };
        self.set_current(Some(identity.clone())).await;
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.check_available()?;
        self.set_current(None).await;
        Ok(())
    }
}
