use std::time::Duration;

use async_trait::async_trait;

use super::model::{ClusterInfo, ExecuteScriptRequest, ExecuteScriptResponse, Row};
use super::{ScriptRunner, TelemetryError};

/// Default request timeout applied by the Pixie client
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Pixie API, authorized with an API key
#[derive(Debug, Clone)]
pub struct PixieClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PixieClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, TelemetryError> {
        Self::with_timeout(api_key, base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TelemetryError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TelemetryError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Connect to a cluster, fetching its metadata to confirm it is reachable
    pub async fn connect(&self, cluster_id: &str) -> Result<PixieConnection, TelemetryError> {
        let url = format!("{}/api/v1/clusters/{}", self.base_url, cluster_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| TelemetryError::Network(e.to_string()))?;

        let cluster: ClusterInfo = decode(response).await?;

        Ok(PixieConnection {
            client: self.clone(),
            cluster,
        })
    }
}

/// An open connection to one cluster
#[derive(Debug, Clone)]
pub struct PixieConnection {
    client: PixieClient,
    cluster: ClusterInfo,
}

impl PixieConnection {
    pub fn id(&self) -> &str {
        &self.cluster.id
    }

    pub fn name(&self) -> &str {
        &self.cluster.name
    }

    /// Prepare a script for execution on this cluster
    pub fn prepare(&self, script: impl Into<String>) -> PreparedScript<'_> {
        PreparedScript {
            conn: self,
            script: script.into(),
        }
    }
}

#[async_trait]
impl ScriptRunner for PixieConnection {
    async fn run_script(&self, script: &str, table: &str) -> Result<Vec<Row>, TelemetryError> {
        self.prepare(script).results(table).await
    }
}

/// A script bound to a connection, ready to be executed
#[derive(Debug)]
pub struct PreparedScript<'a> {
    conn: &'a PixieConnection,
    script: String,
}

impl PreparedScript<'_> {
    /// Execute the script and return the rows of one output table
    pub async fn results(&self, table: &str) -> Result<Vec<Row>, TelemetryError> {
        let client = &self.conn.client;
        let url = format!(
            "{}/api/v1/clusters/{}/scripts/execute",
            client.base_url,
            self.conn.id()
        );
        let request = ExecuteScriptRequest {
            script: self.script.clone(),
        };

        let response = client
            .http_client
            .post(&url)
            .bearer_auth(&client.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TelemetryError::Network(e.to_string()))?;

        let result: ExecuteScriptResponse = decode(response).await?;
        let table = result.into_table(table)?;

        tracing::debug!(
            cluster = %self.conn.name(),
            table = %table.name,
            rows = table.rows.len(),
            "Script executed"
        );

        Ok(table.into_rows())
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TelemetryError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TelemetryError::Api {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| TelemetryError::Decode(e.to_string()))
}
