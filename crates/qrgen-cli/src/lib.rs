//! Shared pieces of the `qrgen` command-line client.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use qrgen_core::{Config, SavedCodeRecord, StoreBackend};
use qrgen_services::{
    create_code_store, AuthProvider, CodeRenderer, ConfirmPrompt, GenerationWorkflow,
    HostedAuthProvider, HostedClient, IdentityContext, MemoryAuthProvider, PersistenceGateway,
    RenderOptions,
};
use serde::Serialize;

pub const EMAIL_VAR: &str = "QRGEN_EMAIL";
pub const PASSWORD_VAR: &str = "QRGEN_PASSWORD";

/// Truncate to `max_len` characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Tracing for the CLI goes to stderr so stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qrgen=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// One row of `qrgen list`
#[derive(Debug, Serialize)]
pub struct RecordSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub symbology: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<&SavedCodeRecord> for RecordSummary {
    fn from(record: &SavedCodeRecord) -> Self {
        Self {
            id: record.id.clone(),
            symbology: record.symbology.to_string(),
            text: truncate_string(&record.source_text, 50),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// `QRGEN_EMAIL` and `QRGEN_PASSWORD`, both required
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let email = lookup(EMAIL_VAR).filter(|v| !v.is_empty())?;
        let password = lookup(PASSWORD_VAR).filter(|v| !v.is_empty())?;
        Some(Self { email, password })
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks on stderr and reads one line from stdin
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, message: &str) -> bool {
        eprint!("{} [y/N] ", message);
        if std::io::stderr().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(_) => is_affirmative(&line),
            Err(_) => false,
        }
    }
}

/// Everything a command needs, wired for the configured backend
pub struct CliSession {
    pub config: Config,
    pub identity: Arc<IdentityContext>,
    pub gateway: PersistenceGateway,
    pub workflow: GenerationWorkflow,
}

impl CliSession {
    pub async fn open(config: Config) -> anyhow::Result<Self> {
        let (provider, hosted): (Arc<dyn AuthProvider>, Option<HostedClient>) =
            match config.store_backend() {
                StoreBackend::Remote => {
                    let client =
                        HostedClient::from_config(&config).context("Hosted backend settings")?;
                    (
                        Arc::new(HostedAuthProvider::new(client.clone())),
                        Some(client),
                    )
                }
                StoreBackend::Local => (Arc::new(MemoryAuthProvider::new()), None),
            };

        let store = create_code_store(&config, hosted).context("Failed to open code store")?;
        let identity = Arc::new(IdentityContext::attach(provider).await);
        let gateway = PersistenceGateway::new(store, identity.clone());
        let renderer = Arc::new(CodeRenderer::new(RenderOptions::from(&config)));
        tracing::debug!(backend = %config.store_backend(), "CLI session opened");

        Ok(Self {
            config,
            identity,
            gateway,
            workflow: GenerationWorkflow::new(renderer),
        })
    }

    /// Sign in when the backend scopes records by user. Local sessions need
    /// no identity.
    pub async fn sign_in_if_needed(&self, credentials: Option<&Credentials>) -> anyhow::Result<()> {
        if !self.config.store_backend().requires_identity() {
            return Ok(());
        }
        let credentials = credentials.with_context(|| {
            format!(
                "Remote storage needs {} and {} to be set",
                EMAIL_VAR, PASSWORD_VAR
            )
        })?;
        self.identity
            .sign_in(&credentials.email, &credentials.password)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrgen_core::{AppConfig, Symbology};
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_counts_characters() {
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
    }

    #[test]
    fn credentials_need_both_vars() {
        let mut vars = HashMap::new();
        vars.insert(EMAIL_VAR, "a@example.com".to_string());
        assert!(Credentials::from_lookup(|k| vars.get(k).cloned()).is_none());

        vars.insert(PASSWORD_VAR, "secret1".to_string());
        let creds = Credentials::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(creds.email, "a@example.com");
    }

    fn local_config(dir: &tempfile::TempDir) -> Config {
        let mut app = AppConfig::default();
        app.local_storage_path = dir.path().to_string_lossy().into_owned();
        app.render.settle_delay = Duration::ZERO;
        Config(Box::new(app))
    }

    #[tokio::test]
    async fn local_session_generates_saves_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        let session = CliSession::open(local_config(&dir)).await.unwrap();
        session.sign_in_if_needed(None).await.unwrap();

        let state = session.workflow.generate("hello", Symbology::Code128).await;
        let code = state.code().unwrap();
        session.gateway.save(code).await.unwrap();

        let reopened = CliSession::open(local_config(&dir)).await.unwrap();
        let records = reopened.gateway.list().await.unwrap();
        assert_eq!(records.len(), 1);

        let summary = RecordSummary::from(&records[0]);
        assert_eq!(summary.symbology, "CODE128");
        assert_eq!(summary.text, "hello");
    }

    #[tokio::test]
    async fn remote_session_without_settings_fails() {
        let mut app = AppConfig::default();
        app.store_backend = StoreBackend::Remote;
        assert!(CliSession::open(Config(Box::new(app))).await.is_err());
    }
}
