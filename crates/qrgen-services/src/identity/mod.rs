//! Identity context
//!
//! Tracks who is signed in. The context subscribes to its provider's change
//! notifications when attached and releases the subscription on drop or
//! [`IdentityContext::detach`].

mod hosted;
mod memory;
mod provider;

use std::sync::{Arc, Mutex};

use qrgen_core::{CodeError, CodeResult, Identity, Profile};
use tokio::sync::watch;

pub use hosted::HostedAuthProvider;
pub use memory::MemoryAuthProvider;
pub use provider::{
    AuthError, AuthProvider, IdentityListener, ListenerHandle, ListenerRegistry,
};

impl From<AuthError> for CodeError {
    fn from(err: AuthError) -> Self {
        CodeError::AuthFailed(err.to_string())
    }
}

pub struct IdentityContext {
    provider: Arc<dyn AuthProvider>,
    current: Arc<watch::Sender<Option<Identity>>>,
    subscription: Mutex<Option<ListenerHandle>>,
}

impl IdentityContext {
    /// Subscribe to `provider` and seed the current identity from it
    pub async fn attach(provider: Arc<dyn AuthProvider>) -> Self {
        let (sender, _) = watch::channel(None);
        let current = Arc::new(sender);

        let slot = current.clone();
        let handle = provider.on_identity_change(Arc::new(move |identity| {
            slot.send_replace(identity);
        }));

        let context = Self {
            provider,
            current,
            subscription: Mutex::new(Some(handle)),
        };
        context.resolve().await;
        context
    }

    pub fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    /// Follow identity changes
    pub fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    /// Ask the provider who is signed in. A provider error resolves to none.
    pub async fn resolve(&self) -> Option<Identity> {
        let identity = match self.provider.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to resolve identity");
                None
            }
        };
        self.current.send_replace(identity.clone());
        identity
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> CodeResult<Identity> {
        let identity = self.provider.sign_in(email, password).await.map_err(|e| {
            tracing::debug!(error = %e, "Sign-in failed");
            CodeError::from(e)
        })?;
        tracing::info!(user_id = %identity.id, "Signed in");
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    /// Create an account. The returned identity is the new account; `current`
    /// only changes when the provider opened a session for it.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &Profile,
    ) -> CodeResult<Identity> {
        let identity = self
            .provider
            .sign_up(email, password, profile)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Sign-up failed");
                CodeError::from(e)
            })?;
        // An unconfirmed account opens no session; current follows the provider
        let signed_in = self.resolve().await;
        tracing::info!(
            user_id = %identity.id,
            signed_in = signed_in.as_ref().map(|i| i.id.as_str()),
            "Signed up"
        );
        Ok(identity)
    }

    /// Sign out with the provider, then forget the identity. The identity is
    /// cleared even when the provider call fails.
    pub async fn sign_out(&self) -> CodeResult<()> {
        let result = self.provider.sign_out().await;
        self.current.send_replace(None);
        result.map_err(CodeError::from)
    }

    /// Stop following provider notifications
    pub fn detach(&self) {
        if let Ok(mut subscription) = self.subscription.lock() {
            subscription.take();
        }
    }
}
