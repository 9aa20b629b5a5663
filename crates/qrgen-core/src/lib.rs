//! qrgen Core Library
//!
//! This crate provides the domain models, error taxonomy and configuration
//! shared by the renderer, the persistence backends, the services layer and
//! both front-ends (HTTP and CLI).

pub mod config;
pub mod error;
pub mod models;
pub mod store_types;

// Re-export commonly used types
pub use config::{AppConfig, BaseConfig, Config, RenderConfig};
pub use error::{CodeError, CodeResult, ErrorMetadata, LogLevel};
pub use models::{
    decode_png_data_url, png_data_url, ErrorCorrectionLevel, GeneratedCode, Identity,
    NewCodeRecord, Profile, SavedCodeRecord, Symbology, PNG_DATA_URL_PREFIX,
};
pub use store_types::StoreBackend;
