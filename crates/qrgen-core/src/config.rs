//! Configuration module
//!
//! Server, renderer and persistence settings, read from the environment
//! (optionally seeded from a `.env` file).

use std::env;
use std::time::Duration;

use crate::models::ErrorCorrectionLevel;
use crate::store_types::StoreBackend;

const DEFAULT_PORT: u16 = 3000;
const QR_SIZE: u32 = 256;
const MODULE_WIDTH: u32 = 2;
const BAR_HEIGHT: u32 = 100;
const BARCODE_MARGIN: u32 = 10;
const BARCODE_MAX_WIDTH: u32 = 4096;
const BARCODE_SETTLE_MS: u64 = 50;
/// Upper bound for `QR_SIZE`; the surface is `qr_size`² RGBA pixels
const MAX_QR_SIZE: u32 = 4096;
const MAX_BARCODE_WIDTH: u32 = 16384;

/// Base configuration shared by the server and the CLI
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub public_dir: String,
}

/// Symbol renderer settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    pub qr_size: u32,
    pub error_correction: ErrorCorrectionLevel,
    pub module_width: u32,
    pub bar_height: u32,
    pub margin: u32,
    pub max_width: u32,
    pub settle_delay: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            qr_size: QR_SIZE,
            error_correction: ErrorCorrectionLevel::Medium,
            module_width: MODULE_WIDTH,
            bar_height: BAR_HEIGHT,
            margin: BARCODE_MARGIN,
            max_width: BARCODE_MAX_WIDTH,
            settle_delay: Duration::from_millis(BARCODE_SETTLE_MS),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base: BaseConfig,
    pub render: RenderConfig,
    pub store_backend: StoreBackend,
    pub local_storage_path: String,
    pub hosted_url: Option<String>,
    pub hosted_anon_key: Option<String>,
    pub hosted_table: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig {
                server_port: DEFAULT_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                public_dir: "public".to_string(),
            },
            render: RenderConfig::default(),
            store_backend: StoreBackend::Local,
            local_storage_path: ".qrgen".to_string(),
            hosted_url: None,
            hosted_anon_key: None,
            hosted_table: "QRCodes".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Default for Config {
    fn default() -> Self {
        Config(Box::default())
    }
}

impl Config {
    fn as_app(&self) -> &AppConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_app().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = AppConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_app().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_app().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_app().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_app().base.environment
    }

    pub fn public_dir(&self) -> &str {
        &self.as_app().base.public_dir
    }

    pub fn render(&self) -> &RenderConfig {
        &self.as_app().render
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.as_app().store_backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.as_app().local_storage_path
    }

    pub fn hosted_url(&self) -> Option<&str> {
        self.as_app().hosted_url.as_deref()
    }

    pub fn hosted_anon_key(&self) -> Option<&str> {
        self.as_app().hosted_anon_key.as_deref()
    }

    pub fn hosted_table(&self) -> &str {
        &self.as_app().hosted_table
    }
}

/// Numeric setting: unset falls back to `default`, unparseable is an error
fn parse_number<T, F>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", key)),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Build from a key lookup. `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: parse_number(&lookup, "PORT", DEFAULT_PORT)?,
            cors_origins,
            environment,
            public_dir: lookup("PUBLIC_DIR").unwrap_or(defaults.base.public_dir),
        };

        let error_correction = match lookup("QR_ERROR_CORRECTION") {
            Some(level) => level.parse()?,
            None => ErrorCorrectionLevel::Medium,
        };

        let render = RenderConfig {
            qr_size: parse_number(&lookup, "QR_SIZE", QR_SIZE)?,
            error_correction,
            module_width: MODULE_WIDTH,
            bar_height: BAR_HEIGHT,
            margin: BARCODE_MARGIN,
            max_width: parse_number(&lookup, "BARCODE_MAX_WIDTH", BARCODE_MAX_WIDTH)?,
            settle_delay: Duration::from_millis(parse_number(
                &lookup,
                "BARCODE_SETTLE_MS",
                BARCODE_SETTLE_MS,
            )?),
        };

        let store_backend = match lookup("STORE_BACKEND") {
            Some(backend) => backend.parse()?,
            None => StoreBackend::Local,
        };

        Ok(AppConfig {
            base,
            render,
            store_backend,
            local_storage_path: lookup("LOCAL_STORAGE_PATH")
                .unwrap_or(defaults.local_storage_path),
            hosted_url: lookup("HOSTED_URL").filter(|s| !s.trim().is_empty()),
            hosted_anon_key: lookup("HOSTED_ANON_KEY").filter(|s| !s.trim().is_empty()),
            hosted_table: lookup("HOSTED_TABLE").unwrap_or(defaults.hosted_table),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.render.qr_size < 21 {
            return Err(anyhow::anyhow!(
                "QR_SIZE must be at least 21 pixels (one pixel per module of the smallest symbol)"
            ));
        }

        if self.render.qr_size > MAX_QR_SIZE {
            return Err(anyhow::anyhow!(
                "QR_SIZE must be at most {} pixels",
                MAX_QR_SIZE
            ));
        }

        if self.render.max_width < self.render.margin * 2 {
            return Err(anyhow::anyhow!(
                "BARCODE_MAX_WIDTH must leave room for the barcode margins"
            ));
        }

        if self.render.max_width > MAX_BARCODE_WIDTH {
            return Err(anyhow::anyhow!(
                "BARCODE_MAX_WIDTH must be at most {} pixels",
                MAX_BARCODE_WIDTH
            ));
        }

        match self.store_backend {
            StoreBackend::Local => {
                if self.local_storage_path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local store backend"
                    ));
                }
            }
            StoreBackend::Remote => {
                match self.hosted_url.as_deref() {
                    None => {
                        return Err(anyhow::anyhow!(
                            "HOSTED_URL must be set when using remote store backend"
                        ))
                    }
                    Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                        return Err(anyhow::anyhow!("HOSTED_URL must be an http(s) URL"))
                    }
                    Some(_) => {}
                }
                if self.hosted_anon_key.is_none() {
                    return Err(anyhow::anyhow!(
                        "HOSTED_ANON_KEY must be set when using remote store backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base.server_port, 3000);
        assert_eq!(config.base.public_dir, "public");
        assert_eq!(config.store_backend, StoreBackend::Local);
        assert_eq!(config.hosted_table, "QRCodes");
        assert_eq!(config.render, RenderConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_render_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("QR_SIZE", "512"),
            ("QR_ERROR_CORRECTION", "H"),
            ("BARCODE_SETTLE_MS", "0"),
            ("BARCODE_MAX_WIDTH", "2000"),
        ]))
        .unwrap();
        assert_eq!(config.render.qr_size, 512);
        assert_eq!(config.render.error_correction, ErrorCorrectionLevel::High);
        assert_eq!(config.render.settle_delay, Duration::ZERO);
        assert_eq!(config.render.max_width, 2000);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("PORT", "abc")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_render_numbers_are_rejected() {
        for key in ["QR_SIZE", "BARCODE_MAX_WIDTH", "BARCODE_SETTLE_MS"] {
            let err = AppConfig::from_lookup(lookup_from(&[(key, "big")])).unwrap_err();
            assert_eq!(err.to_string(), format!("{} must be a valid number", key));
        }
    }

    #[test]
    fn test_oversized_surfaces_fail_validation() {
        let config = AppConfig::from_lookup(lookup_from(&[("QR_SIZE", "100000")])).unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_lookup(lookup_from(&[("QR_SIZE", "4096")])).unwrap();
        assert!(config.validate().is_ok());

        let config =
            AppConfig::from_lookup(lookup_from(&[("BARCODE_MAX_WIDTH", "1000000")])).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let result = AppConfig::from_lookup(lookup_from(&[("ENVIRONMENT", "production")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_remote_requires_hosted_settings() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("STORE_BACKEND", "remote")])).unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "remote"),
            ("HOSTED_URL", "https://project.example.co"),
            ("HOSTED_ANON_KEY", "anon"),
        ]))
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hosted_url_must_be_http() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "remote"),
            ("HOSTED_URL", "ftp://example.com"),
            ("HOSTED_ANON_KEY", "anon"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }
}
