//! Slack Web API client

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatError, MessageSink};

/// Slack bot client posting through `chat.postMessage`
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    bot_token: String,
    base_url: String,
}

impl SlackClient {
    pub fn new(
        bot_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ChatError::Client(e.to_string()))?;

        Ok(Self {
            client,
            bot_token: bot_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Post a plain text message to a channel
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        let url = format!("{}/chat.postMessage", self.base_url);
        let payload = PostMessage { channel, text };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // Slack reports most failures as 200 with `ok: false`
        let ok = serde_json::from_str::<PostMessageResponse>(&body)
            .map(|r| r.ok)
            .unwrap_or(false);
        if !ok {
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(channel = %channel, "Slack message posted");
        Ok(())
    }
}

#[async_trait]
impl MessageSink for SlackClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        SlackClient::post_message(self, channel, text).await
    }
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
}
