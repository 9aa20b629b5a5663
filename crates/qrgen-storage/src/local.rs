use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use qrgen_core::{NewCodeRecord, SavedCodeRecord, Symbology};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::device::DeviceStorage;
use crate::rows::{LocalEntry, SAVED_CODES_KEY};
use crate::traits::{CodeStore, StoreResult};
use crate::StoreBackend;

/// Saved codes as a JSON array in device storage
pub struct LocalCodeStore {
    device: Arc<dyn DeviceStorage>,
    // serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl LocalCodeStore {
    pub fn new(device: Arc<dyn DeviceStorage>) -> Self {
        Self {
            device,
            write_lock: Mutex::new(()),
        }
    }

    /// Stored entries in stored order. A missing key is an empty list; an
    /// unreadable array is treated as empty and entries that fail to parse
    /// are skipped.
    fn read_entries(&self) -> StoreResult<Vec<LocalEntry>> {
        let raw = match self.device.get(SAVED_CODES_KEY)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        let values: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(error = %e, key = SAVED_CODES_KEY, "Stored codes are not a JSON array, treating as empty");
                return Ok(Vec::new());
            }
        };

        let entries = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<LocalEntry>(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable saved code entry");
                    None
                }
            })
            .collect();
        Ok(entries)
    }

    fn write_entries(&self, entries: &[LocalEntry]) -> StoreResult<()> {
        let raw = serde_json::to_string(entries)?;
        self.device.set(SAVED_CODES_KEY, &raw)
    }
}

fn newest_first(entries: &mut [LocalEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl CodeStore for LocalCodeStore {
    async fn list(&self, _owner: Option<&str>) -> StoreResult<Vec<SavedCodeRecord>> {
        let mut entries = self.read_entries()?;
        newest_first(&mut entries);
        Ok(entries.into_iter().map(SavedCodeRecord::from).collect())
    }

    async fn find(
        &self,
        _owner: Option<&str>,
        source_text: &str,
        symbology: Symbology,
    ) -> StoreResult<Option<SavedCodeRecord>> {
        Ok(self
            .read_entries()?
            .into_iter()
            .find(|e| e.text == source_text && e.symbology == symbology)
            .map(SavedCodeRecord::from))
    }

    async fn insert(&self, record: NewCodeRecord) -> StoreResult<SavedCodeRecord> {
        let start = Instant::now();
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries()?;

        let now = Utc::now();
        let mut id = now.timestamp_millis();
        while entries.iter().any(|e| e.id == id) {
            id += 1;
        }

        let entry = LocalEntry {
            id,
            text: record.source_text,
            symbology: record.symbology,
            data_url: record.image_data,
            timestamp: now,
        };
        entries.insert(0, entry.clone());
        self.write_entries(&entries)?;

        tracing::info!(
            id,
            symbology = %entry.symbology,
            count = entries.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Saved code to local store"
        );
        Ok(entry.into())
    }

    async fn delete(&self, _owner: Option<&str>, id: &str) -> StoreResult<()> {
        let id: i64 = match id.parse() {
            Ok(id) => id,
            Err(_) => {
                tracing::debug!(id, "Ignoring delete of non-local id");
                return Ok(());
            }
        };

        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries()?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() != before {
            self.write_entries(&entries)?;
            tracing::info!(id, "Deleted code from local store");
        }
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.device.remove(SAVED_CODES_KEY)?;
        tracing::info!("Cleared local store");
        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{FileDeviceStorage, MemoryDeviceStorage};
    use qrgen_core::png_data_url;
    use tempfile::tempdir;

    fn new_record(text: &str, symbology: Symbology) -> NewCodeRecord {
        NewCodeRecord {
            owner: None,
            source_text: text.to_string(),
            symbology,
            image_data: png_data_url(b"png"),
        }
    }

    fn memory_store() -> (Arc<MemoryDeviceStorage>, LocalCodeStore) {
        let device = Arc::new(MemoryDeviceStorage::new());
        let store = LocalCodeStore::new(device.clone());
        (device, store)
    }

    #[tokio::test]
    async fn test_insert_list_newest_first() {
        let (_, store) = memory_store();
        let first = store.insert(new_record("one", Symbology::Qr)).await.unwrap();
        let second = store.insert(new_record("two", Symbology::Qr)).await.unwrap();

        let records = store.list(None).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, second.id);
        assert_eq!(records[1].id, first.id);
        assert!(records.iter().all(|r| r.owner.is_none()));
    }

    #[tokio::test]
    async fn test_ids_are_unique_within_same_millisecond() {
        let (_, store) = memory_store();
        let mut ids = Vec::new();
        for i in 0..20 {
            let record = store
                .insert(new_record(&format!("code {}", i), Symbology::Code128))
                .await
                .unwrap();
            ids.push(record.id);
        }
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[tokio::test]
    async fn test_find_matches_text_and_symbology() {
        let (_, store) = memory_store();
        store.insert(new_record("hello", Symbology::Qr)).await.unwrap();

        assert!(store.find(None, "hello", Symbology::Qr).await.unwrap().is_some());
        assert!(store.find(None, "hello", Symbology::Code128).await.unwrap().is_none());
        assert!(store.find(None, "hell", Symbology::Qr).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_is_noop() {
        let (_, store) = memory_store();
        let record = store.insert(new_record("keep", Symbology::Qr)).await.unwrap();

        store.delete(None, "123").await.unwrap();
        store.delete(None, "not-a-number").await.unwrap();
        assert_eq!(store.list(None).await.unwrap().len(), 1);

        store.delete(None, &record.id).await.unwrap();
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_array_reads_as_empty() {
        let (device, store) = memory_store();
        device.set(SAVED_CODES_KEY, "{not json").unwrap();
        assert!(store.list(None).await.unwrap().is_empty());

        // saving over it starts a fresh array
        store.insert(new_record("fresh", Symbology::Qr)).await.unwrap();
        assert_eq!(store.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_entries_are_skipped() {
        let (device, store) = memory_store();
        device
            .set(
                SAVED_CODES_KEY,
                r#"[
                    {"id": 1, "text": "ok", "type": "qrcode", "dataUrl": "data:image/png;base64,AA==", "timestamp": "2024-01-01T00:00:00Z"},
                    {"id": 2, "text": "bad", "type": "aztec", "dataUrl": "x", "timestamp": "2024-01-01T00:00:00Z"}
                ]"#,
            )
            .unwrap();
        let records = store.list(None).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_text, "ok");
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let (_, store) = memory_store();
        store.insert(new_record("a", Symbology::Qr)).await.unwrap();
        store.insert(new_record("b", Symbology::Qr)).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_backed_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let device = Arc::new(FileDeviceStorage::new(dir.path()).unwrap());
        let store = LocalCodeStore::new(device);
        store.insert(new_record("persisted", Symbology::Ean13)).await.unwrap();

        let reopened = LocalCodeStore::new(Arc::new(FileDeviceStorage::new(dir.path()).unwrap()));
        let records = reopened.list(None).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbology, Symbology::Ean13);
        assert_eq!(reopened.backend_type(), StoreBackend::Local);
    }
}
