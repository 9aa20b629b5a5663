use async_trait::async_trait;
use qrgen_core::{Identity, Profile};
use qrgen_hosted::{HostedClient, HostedError};

use super::provider::{AuthError, AuthProvider, IdentityListener, ListenerHandle, ListenerRegistry};

impl From<HostedError> for AuthError {
    fn from(err: HostedError) -> Self {
        match err {
            HostedError::Status { message, .. } => AuthError::Rejected(message),
            other => AuthError::Unavailable(other.to_string()),
        }
    }
}

/// Auth provider backed by the hosted GoTrue-style endpoints.
///
/// Shares its [`HostedClient`] (and therefore the session) with the remote
/// code store.
pub struct HostedAuthProvider {
    client: HostedClient,
    listeners: ListenerRegistry,
}

impl HostedAuthProvider {
    pub fn new(client: HostedClient) -> Self {
        Self {
            client,
            listeners: ListenerRegistry::default(),
        }
    }

    pub fn client(&self) -> &HostedClient {
        &self.client
    }
}

#[async_trait]
impl AuthProvider for HostedAuthProvider {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        Ok(self.client.current_user().await?.map(Identity::from))
    }

    fn on_identity_change(&self, listener: IdentityListener) -> ListenerHandle {
        self.listeners.subscribe(listener)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = Identity::from(self.client.sign_in_with_password(email, password).await?);
        self.listeners.notify(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &Profile,
    ) -> Result<Identity, AuthError> {
        let identity = Identity::from(self.client.sign_up(email, password, profile).await?);
        if self.client.session().await.is_some() {
            self.listeners.notify(Some(identity.clone()));
        }
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.client.sign_out().await;
        self.listeners.notify(None);
        result.map_err(AuthError::from)
    }
}
