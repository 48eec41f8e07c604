use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::value::Value;
use super::TelemetryError;

/// One row of a result table, with fields addressable by column name
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs, keeping their order
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Look up a field by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    /// Look up a field that the caller cannot do without
    pub fn require(&self, column: &str) -> Result<&Value, TelemetryError> {
        self.get(column)
            .ok_or_else(|| TelemetryError::MissingColumn(column.to_string()))
    }
}

/// Request body for executing a script on a cluster
#[derive(Debug, Serialize)]
pub struct ExecuteScriptRequest {
    pub script: String,
}

/// Response body of a script execution
#[derive(Debug, Deserialize)]
pub struct ExecuteScriptResponse {
    #[serde(default)]
    pub tables: Vec<TableData>,
}

impl ExecuteScriptResponse {
    /// Take the named table out of the response
    pub fn into_table(self, name: &str) -> Result<TableData, TelemetryError> {
        self.tables
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| TelemetryError::TableNotFound(name.to_string()))
    }
}

/// A table as the API returns it: column names plus positional JSON cells
#[derive(Debug, Deserialize)]
pub struct TableData {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl TableData {
    pub fn into_rows(self) -> Vec<Row> {
        let columns: Arc<[String]> = self.columns.into();

        self.rows
            .into_iter()
            .map(|cells| {
                let values = cells
                    .iter()
                    .take(columns.len())
                    .map(Value::from_json)
                    .collect();
                Row::new(Arc::clone(&columns), values)
            })
            .collect()
    }
}

/// Cluster metadata returned when connecting
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterInfo {
    pub id: String,
    pub name: String,
}
