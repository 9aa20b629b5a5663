//! Remote table collaborator
//!
//! Rows travel as JSON objects so the trait stays object-safe; the remote
//! store (de)serializes its own row types on top.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::traits::{StoreError, StoreResult};

/// `column = value` filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFilter {
    pub column: String,
    pub value: String,
}

impl TableFilter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    fn matches(&self, row: &Value) -> bool {
        match row.get(&self.column) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Number(n)) => n.to_string() == self.value,
            Some(Value::Bool(b)) => b.to_string() == self.value,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOrder {
    pub column: String,
    pub descending: bool,
}

impl TableOrder {
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(
        &self,
        table: &str,
        filters: &[TableFilter],
        order: Option<&TableOrder>,
    ) -> StoreResult<Vec<Value>>;

    /// Insert one row and return what the backend stored
    async fn insert(&self, table: &str, row: Value) -> StoreResult<Vec<Value>>;

    async fn delete(&self, table: &str, filters: &[TableFilter]) -> StoreResult<()>;
}

#[cfg(feature = "store-remote")]
mod hosted {
    use super::*;
    use qrgen_hosted::{Filter, HostedClient, HostedError, Order};

    fn backend_error(err: HostedError) -> StoreError {
        StoreError::BackendError(err.to_string())
    }

    fn to_filters(filters: &[TableFilter]) -> Vec<Filter> {
        filters
            .iter()
            .map(|f| Filter::eq(f.column.clone(), f.value.clone()))
            .collect()
    }

    #[async_trait]
    impl TableStore for HostedClient {
        async fn select(
            &self,
            table: &str,
            filters: &[TableFilter],
            order: Option<&TableOrder>,
        ) -> StoreResult<Vec<Value>> {
            let order = order.map(|o| Order {
                column: o.column.clone(),
                descending: o.descending,
            });
            HostedClient::select(self, table, &to_filters(filters), order.as_ref())
                .await
                .map_err(backend_error)
        }

        async fn insert(&self, table: &str, row: Value) -> StoreResult<Vec<Value>> {
            HostedClient::insert(self, table, &row)
                .await
                .map_err(backend_error)
        }

        async fn delete(&self, table: &str, filters: &[TableFilter]) -> StoreResult<()> {
            self.delete_rows(table, &to_filters(filters))
                .await
                .map_err(backend_error)
        }
    }
}

/// In-memory table with integer ids. Can be switched offline to simulate
/// an unreachable backend.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    rows: Mutex<Vec<(String, Value)>>,
    next_id: AtomicI64,
    offline: AtomicBool,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn row_count(&self, table: &str) -> usize {
        self.rows.lock().await.iter().filter(|(t, _)| t == table).count()
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::BackendError("table store is offline".to_string()));
        }
        Ok(())
    }
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(std::cmp::Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => std::cmp::Ordering::Equal,
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn select(
        &self,
        table: &str,
        filters: &[TableFilter],
        order: Option<&TableOrder>,
    ) -> StoreResult<Vec<Value>> {
        self.check_online()?;
        let rows = self.rows.lock().await;
        let mut selected: Vec<Value> = rows
            .iter()
            .filter(|(t, row)| t == table && filters.iter().all(|f| f.matches(row)))
            .map(|(_, row)| row.clone())
            .collect();

        if let Some(order) = order {
            selected.sort_by(|a, b| {
                let ord = compare(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }
        Ok(selected)
    }

    async fn insert(&self, table: &str, mut row: Value) -> StoreResult<Vec<Value>> {
        self.check_online()?;
        let object = row
            .as_object_mut()
            .ok_or_else(|| StoreError::WriteFailed("row must be a JSON object".to_string()))?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).max(1);
        object.entry("id").or_insert_with(|| Value::from(id));

        self.rows.lock().await.push((table.to_string(), row.clone()));
        Ok(vec![row])
    }

    async fn delete(&self, table: &str, filters: &[TableFilter]) -> StoreResult<()> {
        self.check_online()?;
        self.rows
            .lock()
            .await
            .retain(|(t, row)| !(t == table && filters.iter().all(|f| f.matches(row))));
        Ok(())
    }
}
