use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use qrgen_core::{NewCodeRecord, SavedCodeRecord, Symbology};
use serde_json::Value;

use crate::rows::{NewRemoteRow, RemoteRow};
use crate::table::{TableFilter, TableOrder, TableStore};
use crate::traits::{CodeStore, StoreError, StoreResult};
use crate::StoreBackend;

/// Saved codes as rows of a hosted table, one owner per row
pub struct RemoteCodeStore {
    table_store: Arc<dyn TableStore>,
    table: String,
}

impl RemoteCodeStore {
    pub fn new(table_store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            table_store,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn parse_rows(values: Vec<Value>) -> StoreResult<Vec<SavedCodeRecord>> {
        values
            .into_iter()
            .map(|value| {
                serde_json::from_value::<RemoteRow>(value)
                    .map(SavedCodeRecord::from)
                    .map_err(StoreError::from)
            })
            .collect()
    }
}

fn require_owner(owner: Option<&str>) -> StoreResult<&str> {
    owner.ok_or(StoreError::MissingOwner)
}

#[async_trait]
impl CodeStore for RemoteCodeStore {
    async fn list(&self, owner: Option<&str>) -> StoreResult<Vec<SavedCodeRecord>> {
        let owner = require_owner(owner)?;
        let start = Instant::now();
        let values = self
            .table_store
            .select(
                &self.table,
                &[TableFilter::eq("user_id", owner)],
                Some(&TableOrder::desc("created_at")),
            )
            .await?;
        let records = Self::parse_rows(values)?;

        tracing::debug!(
            table = %self.table,
            count = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed remote codes"
        );
        Ok(records)
    }

    async fn find(
        &self,
        owner: Option<&str>,
        source_text: &str,
        symbology: Symbology,
    ) -> StoreResult<Option<SavedCodeRecord>> {
        let owner = require_owner(owner)?;
        let values = self
            .table_store
            .select(
                &self.table,
                &[
                    TableFilter::eq("user_id", owner),
                    TableFilter::eq("text", source_text),
                    TableFilter::eq("type", symbology.as_str()),
                ],
                None,
            )
            .await?;
        Ok(Self::parse_rows(values)?.into_iter().next())
    }

    async fn insert(&self, record: NewCodeRecord) -> StoreResult<SavedCodeRecord> {
        let owner = record.owner.ok_or(StoreError::MissingOwner)?;
        let start = Instant::now();
        let row = NewRemoteRow {
            user_id: owner,
            text: record.source_text,
            symbology: record.symbology,
            data_url: record.image_data,
            created_at: Utc::now(),
        };
        let values = self
            .table_store
            .insert(&self.table, serde_json::to_value(&row)?)
            .await?;
        let stored = Self::parse_rows(values)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::WriteFailed("backend returned no row".to_string()))?;

        tracing::info!(
            table = %self.table,
            id = %stored.id,
            symbology = %stored.symbology,
            duration_ms = start.elapsed().as_millis() as u64,
            "Saved code to remote store"
        );
        Ok(stored)
    }

    async fn delete(&self, owner: Option<&str>, id: &str) -> StoreResult<()> {
        let mut filters = vec![TableFilter::eq("id", id)];
        if let Some(owner) = owner {
            filters.push(TableFilter::eq("user_id", owner));
        }
        self.table_store.delete(&self.table, &filters).await?;
        tracing::info!(table = %self.table, id, "Deleted code from remote store");
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        Err(StoreError::Unsupported {
            backend: StoreBackend::Remote,
            operation: "clear",
        })
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Remote
    }
}
