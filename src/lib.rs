//! sqlwatch: SQL injection alerts from Pixie to Slack
//!
//! Every 30 seconds sqlwatch runs a stored PxL script on a Pixie cluster,
//! formats the possible SQL injections it reports, and posts the digest to a
//! Slack channel.
//!
//! # Example
//!
//! ```no_run
//! use sqlwatch::alerts::Poller;
//! use sqlwatch::chat::SlackClient;
//! use sqlwatch::telemetry::{load_script, PixieClient};
//! use sqlwatch::Config;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let script = load_script(&config.script_path)?;
//!
//! let pixie = PixieClient::new(&config.pixie_api_key, &config.pixie_api_url)?;
//! let conn = pixie.connect(&config.pixie_cluster_id).await?;
//! let slack = SlackClient::new(&config.slack_bot_token, &config.slack_api_url)?;
//!
//! Poller::new(conn, slack, &config, script).run().await?;
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod chat;
pub mod config;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use alerts::{format_digest, Finding, Poller};
pub use config::{Config, ConfigError};
