//! qrgen CLI: generate codes and manage saved ones.
//!
//! Backend settings come from the same environment as the server
//! (`STORE_BACKEND`, `LOCAL_STORAGE_PATH`, `HOSTED_URL`, ...). Remote commands
//! sign in with `QRGEN_EMAIL` / `QRGEN_PASSWORD`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use qrgen_cli::{
    init_tracing, print_json, CliSession, Credentials, RecordSummary, StdinPrompt, PASSWORD_VAR,
};
use qrgen_core::{CodeError, Config, ErrorMetadata, Profile, StoreBackend, Symbology};
use qrgen_services::{download, GenerationState};

#[derive(Parser)]
#[command(name = "qrgen", about = "QR code and barcode generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a code from text or a URL
    Generate {
        text: String,
        /// qrcode, CODE128, CODE39, EAN13, EAN8, UPC, ITF, MSI, pharmacode, codabar
        #[arg(long = "type", default_value = "qrcode")]
        symbology: Symbology,
        /// Write the PNG here instead of printing the data URL
        #[arg(long)]
        out: Option<std::path::PathBuf>,
        /// Also save the code to the configured store
        #[arg(long)]
        save: bool,
    },
    /// List saved codes, newest first
    List,
    /// Delete a saved code by id
    Delete { id: String },
    /// Delete every saved code (local storage only)
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Create an account on the hosted backend (password from QRGEN_PASSWORD)
    SignUp {
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
}

/// User-facing failure: the error's client message, not its debug form
fn user_error(err: CodeError) -> anyhow::Error {
    anyhow::anyhow!(err.client_message())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.validate().context("Configuration validation failed")?;

    let session = CliSession::open(config).await?;
    let credentials = Credentials::from_env();

    match cli.command {
        Commands::Generate {
            text,
            symbology,
            out,
            save,
        } => {
            let code = match session.workflow.generate(&text, symbology).await {
                GenerationState::Succeeded(code) => code,
                GenerationState::Failed { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("generation did not finish: {:?}", other),
            };

            let file = match out {
                Some(path) => {
                    let artifact = download(&code);
                    std::fs::write(&path, &artifact.bytes)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    Some(path.display().to_string())
                }
                None => None,
            };

            let saved_id = if save {
                session.sign_in_if_needed(credentials.as_ref()).await?;
                match session.gateway.save(&code).await {
                    Ok(record) => Some(record.id),
                    Err(err @ CodeError::DuplicateRecord { .. }) => {
                        eprintln!("{}", err.client_message());
                        None
                    }
                    Err(err) => return Err(user_error(err)),
                }
            } else {
                None
            };

            let data_url = file.is_none().then_some(&code.image_data);
            print_json(&serde_json::json!({
                "type": code.symbology,
                "width": code.width,
                "height": code.height,
                "file": file,
                "saved_id": saved_id,
                "data_url": data_url,
            }))?;
        }
        Commands::List => {
            session.sign_in_if_needed(credentials.as_ref()).await?;
            let records = session.gateway.list().await.map_err(user_error)?;
            let summaries: Vec<RecordSummary> = records.iter().map(RecordSummary::from).collect();
            print_json(&summaries)?;
        }
        Commands::Delete { id } => {
            session.sign_in_if_needed(credentials.as_ref()).await?;
            session.gateway.delete(&id).await.map_err(user_error)?;
            print_json(&serde_json::json!({ "success": true, "message": "Code deleted" }))?;
        }
        Commands::Clear { yes } => {
            let cleared = if yes {
                session.gateway.clear_all(&|_: &str| true).await
            } else {
                session.gateway.clear_all(&StdinPrompt).await
            }
            .map_err(user_error)?;
            print_json(&serde_json::json!({ "cleared": cleared }))?;
        }
        Commands::SignUp {
            email,
            first_name,
            last_name,
        } => {
            if session.config.store_backend() != StoreBackend::Remote {
                anyhow::bail!("sign-up needs STORE_BACKEND=remote");
            }
            let password = std::env::var(PASSWORD_VAR)
                .with_context(|| format!("{} must be set", PASSWORD_VAR))?;
            let profile = Profile {
                first_name,
                last_name,
            };
            let identity = session
                .identity
                .sign_up(&email, &password, &profile)
                .await
                .map_err(user_error)?;
            print_json(&serde_json::json!({ "id": identity.id, "email": identity.email }))?;
        }
    }

    Ok(())
}
