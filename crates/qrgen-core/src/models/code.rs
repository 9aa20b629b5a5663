use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::symbology::Symbology;
use crate::error::CodeError;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode PNG bytes as a `data:image/png;base64,...` URL
pub fn png_data_url(png: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png))
}

/// Decode a PNG data URL back into raw bytes
pub fn decode_png_data_url(data_url: &str) -> Result<Vec<u8>, CodeError> {
    let payload = data_url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| CodeError::InvalidInput("Not a PNG data URL".to_string()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| CodeError::InvalidInput(format!("Invalid base64 payload: {}", e)))
}

/// A freshly rendered code. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCode {
    pub source_text: String,
    pub symbology: Symbology,
    pub image_data: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub png: Vec<u8>,
}

impl GeneratedCode {
    pub fn from_png(
        source_text: impl Into<String>,
        symbology: Symbology,
        png: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            symbology,
            image_data: png_data_url(&png),
            width,
            height,
            png,
        }
    }
}

/// A code as stored by one of the persistence backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCodeRecord {
    pub id: String,
    pub owner: Option<String>,
    pub source_text: String,
    pub symbology: Symbology,
    pub image_data: String,
    pub created_at: DateTime<Utc>,
}

impl SavedCodeRecord {
    pub fn matches(&self, owner: Option<&str>, source_text: &str, symbology: Symbology) -> bool {
        self.owner.as_deref() == owner
            && self.source_text == source_text
            && self.symbology == symbology
    }
}

/// Insert payload; the backend assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCodeRecord {
    pub owner: Option<String>,
    pub source_text: String,
    pub symbology: Symbology,
    pub image_data: String,
}

impl NewCodeRecord {
    pub fn from_generated(code: &GeneratedCode, owner: Option<String>) -> Self {
        Self {
            owner,
            source_text: code.source_text.clone(),
            symbology: code.symbology,
            image_data: code.image_data.clone(),
        }
    }
}
