//! sqlwatch
//!
//! Run with: cargo run
//!
//! Required environment variables:
//! - PIXIE_API_KEY: Pixie API key
//! - PIXIE_CLUSTER_ID: Cluster to run the script on
//! - SLACK_BOT_TOKEN: Slack bot token
//! - SLACK_ALERT_CHANNEL: Channel to post in (the Slack app must be a member)
//!
//! Optional:
//! - PIXIE_API_URL: Pixie API base URL (default: https://work.withpixie.ai)
//! - SLACK_API_URL: Slack Web API base URL (default: https://slack.com/api)
//! - SQLWATCH_SCRIPT_PATH: PxL script to run (default: scripts/sql_injections.pxl)
//! - SQLWATCH_NOTIFY_ON_FAILURE: Post a notice if monitoring stops (default: false)
//! - RUST_LOG: Log level (default: info)

use sqlwatch::alerts::Poller;
use sqlwatch::chat::SlackClient;
use sqlwatch::telemetry::{load_script, PixieClient};
use sqlwatch::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sqlwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let script = load_script(&config.script_path)
        .map_err(|e| format!("Failed to read script {}: {}", config.script_path, e))?;

    tracing::debug!("Authorizing Pixie client.");
    let pixie = PixieClient::new(&config.pixie_api_key, &config.pixie_api_url)?;
    let conn = pixie.connect(&config.pixie_cluster_id).await?;
    tracing::debug!("Pixie client connected to {} cluster.", conn.name());

    tracing::debug!("Authorizing Slack client.");
    let slack = SlackClient::new(&config.slack_bot_token, &config.slack_api_url)?;

    let poller = Poller::new(conn, slack, &config, script);
    poller.run().await?;

    Ok(())
}
