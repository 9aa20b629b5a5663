//! PostgREST-style table endpoints

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{HostedClient, Result};

/// Equality filter, sent as `column=eq.value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    fn to_query(&self) -> (String, String) {
        (self.column.clone(), format!("eq.{}", self.value))
    }
}

/// Sort order, sent as `order=column.desc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    fn to_query(&self) -> (String, String) {
        let direction = if self.descending { "desc" } else { "asc" };
        ("order".to_string(), format!("{}.{}", self.column, direction))
    }
}

fn table_path(table: &str) -> String {
    format!("/rest/v1/{}", table)
}

impl HostedClient {
    /// `GET /rest/v1/{table}?col=eq.v&order=c.desc`
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<T>> {
        let mut query: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        query.extend(filters.iter().map(Filter::to_query));
        query.extend(order.map(Order::to_query));

        let request = self.client.get(self.build_url(&table_path(table))).query(&query);
        let rows: Vec<T> = self.send(request).await?.json().await?;

        tracing::debug!(table, rows = rows.len(), "Selected rows");
        Ok(rows)
    }

    /// `POST /rest/v1/{table}` returning the stored representation
    pub async fn insert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<Vec<T>> {
        let request = self
            .client
            .post(self.build_url(&table_path(table)))
            .header("Prefer", "return=representation")
            .json(row);
        let rows: Vec<T> = self.send(request).await?.json().await?;

        tracing::debug!(table, rows = rows.len(), "Inserted rows");
        Ok(rows)
    }

    /// `DELETE /rest/v1/{table}?col=eq.v`. Matching nothing is not an error.
    pub async fn delete_rows(&self, table: &str, filters: &[Filter]) -> Result<()> {
        let query: Vec<(String, String)> = filters.iter().map(Filter::to_query).collect();
        let request = self
            .client
            .delete(self.build_url(&table_path(table)))
            .query(&query);
        self.send(request).await?;

        tracing::debug!(table, filters = filters.len(), "Deleted rows");
        Ok(())
    }
}
