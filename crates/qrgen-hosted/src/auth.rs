//! GoTrue-style auth endpoints

use qrgen_core::{Identity, Profile};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{HostedClient, HostedError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<HostedUser> for Identity {
    fn from(user: HostedUser) -> Self {
        Identity {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: HostedUser,
}

/// Token and sign-up responses. Sign-up without auto-confirm returns the
/// bare user instead of a session.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<HostedUser>,
    id: Option<String>,
    email: Option<String>,
}

impl AuthResponse {
    fn into_parts(self) -> Result<(HostedUser, Option<Session>)> {
        match (self.access_token, self.user) {
            (Some(access_token), Some(user)) => {
                let session = Session {
                    access_token,
                    refresh_token: self.refresh_token,
                    user: user.clone(),
                };
                Ok((user, Some(session)))
            }
            (_, Some(user)) => Ok((user, None)),
            (_, None) => match self.id {
                Some(id) => Ok((
                    HostedUser {
                        id,
                        email: self.email,
                    },
                    None,
                )),
                None => Err(HostedError::Decode(
                    "auth response carries neither a session nor a user".to_string(),
                )),
            },
        }
    }
}

impl HostedClient {
    /// `POST /auth/v1/token?grant_type=password`. Stores the session.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<HostedUser> {
        let request = self
            .client
            .post(self.build_url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        let response: AuthResponse = self.send(request).await?.json().await?;
        let (user, session) = response.into_parts()?;
        let session = session.ok_or_else(|| {
            HostedError::Decode("token response did not include an access token".to_string())
        })?;
        self.set_session(Some(session)).await;

        tracing::info!(user_id = %user.id, "Signed in to hosted backend");
        Ok(user)
    }

    /// `POST /auth/v1/signup` with the profile as user metadata. When the
    /// project auto-confirms, the returned session is stored.
    pub async fn sign_up(&self, email: &str, password: &str, profile: &Profile) -> Result<HostedUser> {
        let request = self.client.post(self.build_url("/auth/v1/signup")).json(&json!({
            "email": email,
            "password": password,
            "data": {
                "first_name": profile.first_name,
                "last_name": profile.last_name,
            },
        }));

        let response: AuthResponse = self.send(request).await?.json().await?;
        let (user, session) = response.into_parts()?;
        let confirmed = session.is_some();
        if confirmed {
            self.set_session(session).await;
        }

        tracing::info!(user_id = %user.id, confirmed, "Signed up on hosted backend");
        Ok(user)
    }

    /// `POST /auth/v1/logout`. The local session is dropped even when the
    /// backend call fails.
    pub async fn sign_out(&self) -> Result<()> {
        if self.session().await.is_none() {
            return Ok(());
        }
        let request = self.client.post(self.build_url("/auth/v1/logout"));
        let result = self.send(request).await.map(|_| ());
        self.set_session(None).await;
        result
    }

    /// `GET /auth/v1/user` for the stored session; `None` when signed out.
    pub async fn current_user(&self) -> Result<Option<HostedUser>> {
        if self.session().await.is_none() {
            return Ok(None);
        }
        let request = self.client.get(self.build_url("/auth/v1/user"));
        match self.send(request).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(err) if err.is_unauthorized() => {
                tracing::debug!("Stored session rejected, clearing");
                self.set_session(None).await;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
