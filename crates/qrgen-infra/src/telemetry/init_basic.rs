use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "qrgen=debug,tower_http=debug";

#[derive(Debug, Clone)]
pub struct TelemetryOptions {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
}

impl TelemetryOptions {
    pub fn new(service_name: impl Into<String>, environment: impl Into<String>) -> Self {
        let environment = environment.into();
        let json = matches!(environment.to_lowercase().as_str(), "production" | "prod");
        Self {
            service_name: service_name.into(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment,
            json,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry(options: &TelemetryOptions) -> Result<(), Box<dyn std::error::Error>> {
    if options.json {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
    }

    tracing::info!(
        service = %options.service_name,
        version = %options.service_version,
        environment = %options.environment,
        json = options.json,
        "Tracing initialized"
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
