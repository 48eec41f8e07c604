//! Chat delivery for digests

pub mod slack;

use async_trait::async_trait;

pub use slack::SlackClient;

/// Destination for text messages addressed to a channel
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChatError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Request to Slack API failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl ChatError {
    /// HTTP status reported by the chat API, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body reported by the chat API
    pub fn body(&self) -> Option<&str> {
        match self {
            ChatError::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}
