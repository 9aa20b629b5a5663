//! Wire shapes of the two backends
//!
//! Readers accept both field spellings (`dataUrl`/`data_url`,
//! `timestamp`/`created_at`); writers use the backend's own.

use std::fmt;

use chrono::{DateTime, Utc};
use qrgen_core::{SavedCodeRecord, Symbology};
use serde::{Deserialize, Serialize};

/// Key of the local saved-codes array
pub const SAVED_CODES_KEY: &str = "savedCodes";

/// Entry of the local `savedCodes` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEntry {
    /// Milliseconds since the epoch at save time, bumped on collision
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub symbology: Symbology,
    #[serde(rename = "dataUrl", alias = "data_url")]
    pub data_url: String,
    #[serde(alias = "created_at")]
    pub timestamp: DateTime<Utc>,
}

impl From<LocalEntry> for SavedCodeRecord {
    fn from(entry: LocalEntry) -> Self {
        SavedCodeRecord {
            id: entry.id.to_string(),
            owner: None,
            source_text: entry.text,
            symbology: entry.symbology,
            image_data: entry.data_url,
            created_at: entry.timestamp,
        }
    }
}

/// Backend-assigned row id; integer or text depending on the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{}", id),
            RowId::Text(id) => write!(f, "{}", id),
        }
    }
}

/// Row of the remote codes table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRow {
    pub id: RowId,
    pub user_id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub symbology: Symbology,
    #[serde(alias = "dataUrl")]
    pub data_url: String,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl From<RemoteRow> for SavedCodeRecord {
    fn from(row: RemoteRow) -> Self {
        SavedCodeRecord {
            id: row.id.to_string(),
            owner: Some(row.user_id),
            source_text: row.text,
            symbology: row.symbology,
            image_data: row.data_url,
            created_at: row.created_at,
        }
    }
}

/// Insert payload for the remote table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRemoteRow {
    pub user_id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub symbology: Symbology,
    pub data_url: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_entry_accepts_both_spellings() {
        let camel: LocalEntry = serde_json::from_value(json!({
            "id": 1700000000000i64,
            "text": "hello",
            "type": "qrcode",
            "dataUrl": "data:image/png;base64,AA==",
            "timestamp": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let snake: LocalEntry = serde_json::from_value(json!({
            "id": 1700000000000i64,
            "text": "hello",
            "type": "qrcode",
            "data_url": "data:image/png;base64,AA==",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(camel, snake);

        let written = serde_json::to_value(&camel).unwrap();
        assert!(written.get("dataUrl").is_some());
        assert!(written.get("timestamp").is_some());
    }

    #[test]
    fn test_remote_row_ids_and_mapping() {
        let row: RemoteRow = serde_json::from_value(json!({
            "id": 42,
            "user_id": "user-1",
            "text": "4006381333931",
            "type": "EAN13",
            "dataUrl": "data:image/png;base64,AA==",
            "created_at": "2024-01-01T00:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(row.id, RowId::Int(42));

        let record = SavedCodeRecord::from(row);
        assert_eq!(record.id, "42");
        assert_eq!(record.owner.as_deref(), Some("user-1"));
        assert_eq!(record.symbology, Symbology::Ean13);

        let uuid_row: RemoteRow = serde_json::from_value(json!({
            "id": "6f1c6c1e-0000-4000-8000-000000000000",
            "user_id": "user-1",
            "text": "x",
            "type": "qrcode",
            "data_url": "data:image/png;base64,AA==",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(matches!(uuid_row.id, RowId::Text(_)));
    }
}
