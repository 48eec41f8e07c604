//! Telemetry backend access
//!
//! Executes stored scripts against a Pixie cluster and hands back the rows of
//! a named output table.

pub mod client;
pub mod model;
pub mod value;

use async_trait::async_trait;

pub use client::{PixieClient, PixieConnection, PreparedScript};
pub use model::{ClusterInfo, Row, TableData};
pub use value::Value;

/// Something that can execute a script and return one of its output tables
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run_script(&self, script: &str, table: &str) -> Result<Vec<Row>, TelemetryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Pixie API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Deserialization error: {0}")]
    Decode(String),

    #[error("Table not found in script output: {0}")]
    TableNotFound(String),

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Read the stored query script from disk
pub fn load_script(path: impl AsRef<std::path::Path>) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}
