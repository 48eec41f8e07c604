//! Poll-and-notify loop

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

use super::formatter::{format_digest, format_stopped_notice, Finding};
use crate::chat::{ChatError, MessageSink};
use crate::config::Config;
use crate::telemetry::{ScriptRunner, TelemetryError};

/// Time between the starts of two notify cycles
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Output table of the stored script that holds the findings
pub const RESULT_TABLE: &str = "possible_sql_injections";

/// What happened to one cycle's digest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Delivered { findings: usize },
    DeliveryFailed { findings: usize },
}

/// Runs the stored script on a fixed interval and posts each digest
pub struct Poller<Q, S> {
    source: Q,
    sink: S,
    channel: String,
    script: String,
    interval: Duration,
    notify_on_failure: bool,
}

impl<Q, S> Poller<Q, S>
where
    Q: ScriptRunner,
    S: MessageSink,
{
    pub fn new(source: Q, sink: S, config: &Config, script: impl Into<String>) -> Self {
        Self {
            source,
            sink,
            channel: config.slack_channel.clone(),
            script: script.into(),
            interval: POLL_INTERVAL,
            notify_on_failure: config.notify_on_failure,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run cycles until one fails
    ///
    /// The first cycle starts immediately. Errors reported by the Slack API
    /// are logged and do not stop the loop. A telemetry failure or a failure
    /// to reach Slack at all ends it and is returned.
    pub async fn run(&self) -> Result<(), PollError> {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            channel = %self.channel,
            interval = ?self.interval,
            "Message scheduled for Slack channel"
        );

        loop {
            ticker.tick().await;

            if let Err(e) = self.run_cycle().await {
                tracing::error!(error = %e, "Monitoring stopped");
                if self.notify_on_failure {
                    self.post_stopped_notice(&e).await;
                }
                return Err(e);
            }
        }
    }

    /// Query, format and deliver once
    pub async fn run_cycle(&self) -> Result<CycleOutcome, PollError> {
        let rows = self.source.run_script(&self.script, RESULT_TABLE).await?;
        let findings = rows
            .iter()
            .map(Finding::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let msg = format_digest(&findings);
        tracing::info!("Sending {:?} to {:?}", msg, self.channel);

        match self.sink.post_message(&self.channel, &msg).await {
            Ok(()) => Ok(CycleOutcome::Delivered {
                findings: findings.len(),
            }),
            Err(e @ ChatError::Api { .. }) => {
                log_delivery_error(&e);
                Ok(CycleOutcome::DeliveryFailed {
                    findings: findings.len(),
                })
            }
            Err(e) => Err(PollError::Chat(e)),
        }
    }

    async fn post_stopped_notice(&self, reason: &PollError) {
        let notice = format_stopped_notice(reason);
        if let Err(e) = self.sink.post_message(&self.channel, &notice).await {
            log_delivery_error(&e);
        }
    }
}

fn log_delivery_error(e: &ChatError) {
    match (e.status(), e.body()) {
        (Some(status), Some(body)) => {
            tracing::error!(status, "Request to Slack API failed: {}", status);
            tracing::error!("{}", body);
        }
        _ => tracing::error!(error = %e, "Request to Slack API failed"),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("telemetry query failed: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("chat delivery failed: {0}")]
    Chat(#[from] ChatError),
}
