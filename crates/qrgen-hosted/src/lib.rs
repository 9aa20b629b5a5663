//! Client for the hosted backend-as-a-service.
//!
//! One [`HostedClient`] talks to both halves of the backend: the GoTrue-style
//! auth endpoints under `/auth/v1` ([`auth`]) and the PostgREST-style table
//! endpoints under `/rest/v1` ([`rest`]). Requests carry the project's anon
//! key as `apikey`, and the session's access token (or the anon key when
//! signed out) as bearer token.

pub mod auth;
pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use qrgen_core::Config;
use reqwest::{Client, RequestBuilder, Response};
use tokio::sync::RwLock;

pub use auth::{HostedUser, Session};
pub use rest::{Filter, Order};

#[derive(Debug, thiserror::Error)]
pub enum HostedError {
    #[error("Hosted backend is not configured: {0}")]
    NotConfigured(String),

    #[error("Request to hosted backend failed: {0}")]
    Transport(String),

    #[error("Hosted backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response from hosted backend: {0}")]
    Decode(String),
}

impl HostedError {
    /// Whether the backend rejected the caller's credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HostedError::Status { status, .. } if *status == 401 || *status == 403)
    }
}

impl From<reqwest::Error> for HostedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HostedError::Decode(err.to_string())
        } else {
            HostedError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, HostedError>;

/// HTTP client for the hosted backend. Cloning shares the session.
#[derive(Clone, Debug)]
pub struct HostedClient {
    client: Client,
    base_url: String,
    anon_key: String,
    session: Arc<RwLock<Option<Session>>>,
}

impl HostedClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HostedError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Build from `HOSTED_URL` / `HOSTED_ANON_KEY` as loaded into [`Config`]
    pub fn from_config(config: &Config) -> Result<Self> {
        let url = config
            .hosted_url()
            .ok_or_else(|| HostedError::NotConfigured("HOSTED_URL is not set".to_string()))?;
        let key = config
            .hosted_anon_key()
            .ok_or_else(|| HostedError::NotConfigured("HOSTED_ANON_KEY is not set".to_string()))?;
        Self::new(url, key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub(crate) async fn set_session(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }

    async fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let token = match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        };
        request
            .header("apikey", self.anon_key.as_str())
            .header("Authorization", format!("Bearer {}", token))
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = self.apply_auth(request).await;
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });
            tracing::debug!(status = status.as_u16(), %message, "Hosted request rejected");
            return Err(HostedError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

/// Pull a readable message out of an auth or REST error body
fn error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return Some(body.trim().to_string()),
    };
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}
