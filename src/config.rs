//! Startup configuration read from the process environment

use std::collections::HashMap;

/// Where to find setup instructions for the required settings
pub const DOCS_URL: &str = "https://docs.px.dev/tutorials/integrations/slackbot-alert/";

pub const PIXIE_API_KEY: &str = "PIXIE_API_KEY";
pub const PIXIE_CLUSTER_ID: &str = "PIXIE_CLUSTER_ID";
pub const SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const SLACK_ALERT_CHANNEL: &str = "SLACK_ALERT_CHANNEL";
pub const PIXIE_API_URL: &str = "PIXIE_API_URL";
pub const SLACK_API_URL: &str = "SLACK_API_URL";
pub const SCRIPT_PATH: &str = "SQLWATCH_SCRIPT_PATH";
pub const NOTIFY_ON_FAILURE: &str = "SQLWATCH_NOTIFY_ON_FAILURE";

pub const DEFAULT_PIXIE_API_URL: &str = "https://work.withpixie.ai";
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
pub const DEFAULT_SCRIPT_PATH: &str = "scripts/sql_injections.pxl";

/// Source of environment variables
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Immutable settings shared by the clients and the poller
#[derive(Clone)]
pub struct Config {
    pub pixie_api_key: String,
    pub pixie_cluster_id: String,
    pub slack_bot_token: String,
    /// Slack channel to post in; the Slack app must be a member of it
    pub slack_channel: String,
    pub pixie_api_url: String,
    pub slack_api_url: String,
    pub script_path: String,
    /// Post a one-time notice when the loop stops on a telemetry error
    pub notify_on_failure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&SystemEnv)
    }

    /// Load the configuration, reporting every missing required variable
    pub fn from_source(env: &impl EnvSource) -> Result<Self, ConfigError> {
        let lookup = |key: &str| env.var(key).filter(|v| !v.is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| match lookup(key) {
            Some(value) => value,
            None => {
                tracing::error!(
                    "Missing `{}` environment variable. For directions on how to find it, see: {}",
                    key,
                    DOCS_URL
                );
                missing.push(key);
                String::new()
            }
        };

        let pixie_api_key = required(PIXIE_API_KEY);
        let pixie_cluster_id = required(PIXIE_CLUSTER_ID);
        let slack_bot_token = required(SLACK_BOT_TOKEN);
        let slack_channel = required(SLACK_ALERT_CHANNEL);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let notify_on_failure = match lookup(NOTIFY_ON_FAILURE) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                key: NOTIFY_ON_FAILURE,
                value: raw,
            })?,
            None => false,
        };

        Ok(Self {
            pixie_api_key,
            pixie_cluster_id,
            slack_bot_token,
            slack_channel,
            pixie_api_url: lookup(PIXIE_API_URL).unwrap_or_else(|| DEFAULT_PIXIE_API_URL.to_string()),
            slack_api_url: lookup(SLACK_API_URL).unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string()),
            script_path: lookup(SCRIPT_PATH).unwrap_or_else(|| DEFAULT_SCRIPT_PATH.to_string()),
            notify_on_failure,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("pixie_api_key", &"<redacted>")
            .field("pixie_cluster_id", &self.pixie_cluster_id)
            .field("slack_bot_token", &"<redacted>")
            .field("slack_channel", &self.slack_channel)
            .field("pixie_api_url", &self.pixie_api_url)
            .field("slack_api_url", &self.slack_api_url)
            .field("script_path", &self.script_path)
            .field("notify_on_failure", &self.notify_on_failure)
            .finish()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CapturedLogs;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete_env() -> HashMap<String, String> {
        env(&[
            (PIXIE_API_KEY, "px-api-key"),
            (PIXIE_CLUSTER_ID, "cluster-1"),
            (SLACK_BOT_TOKEN, "xoxb-token"),
            (SLACK_ALERT_CHANNEL, "#sql-alerts"),
        ])
    }

    #[test]
    fn test_complete_env_with_defaults() {
        let config = Config::from_source(&complete_env()).unwrap();

        assert_eq!(config.pixie_api_key, "px-api-key");
        assert_eq!(config.pixie_cluster_id, "cluster-1");
        assert_eq!(config.slack_bot_token, "xoxb-token");
        assert_eq!(config.slack_channel, "#sql-alerts");
        assert_eq!(config.pixie_api_url, DEFAULT_PIXIE_API_URL);
        assert_eq!(config.slack_api_url, DEFAULT_SLACK_API_URL);
        assert_eq!(config.script_path, DEFAULT_SCRIPT_PATH);
        assert!(!config.notify_on_failure);
    }

    #[test]
    fn test_every_missing_variable_reported() {
        let vars = env(&[(PIXIE_CLUSTER_ID, "cluster-1")]);

        match Config::from_source(&vars) {
            Err(ConfigError::Missing(keys)) => {
                assert_eq!(keys, vec![PIXIE_API_KEY, SLACK_BOT_TOKEN, SLACK_ALERT_CHANNEL]);
            }
            other => panic!("expected missing error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_variables_logged_with_docs_link() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let vars = env(&[(PIXIE_API_KEY, "px-api-key"), (SLACK_BOT_TOKEN, "xoxb-token")]);
        assert!(Config::from_source(&vars).is_err());

        let errors = logs.lines_at("ERROR");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Missing `PIXIE_CLUSTER_ID` environment variable"));
        assert!(errors[1].contains("Missing `SLACK_ALERT_CHANNEL` environment variable"));
        assert!(errors.iter().all(|line| line.contains(DOCS_URL)));
    }

    #[test]
    fn test_complete_env_logs_no_errors() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        assert!(Config::from_source(&complete_env()).is_ok());
        assert!(logs.lines_at("ERROR").is_empty());
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut vars = complete_env();
        vars.insert(SLACK_BOT_TOKEN.to_string(), String::new());

        let err = Config::from_source(&vars).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: SLACK_BOT_TOKEN"
        );
    }

    #[test]
    fn test_optional_overrides() {
        let mut vars = complete_env();
        vars.insert(PIXIE_API_URL.to_string(), "http://localhost:9000".to_string());
        vars.insert(SLACK_API_URL.to_string(), "http://localhost:9001/api".to_string());
        vars.insert(SCRIPT_PATH.to_string(), "/etc/sqlwatch/query.pxl".to_string());
        vars.insert(NOTIFY_ON_FAILURE.to_string(), "on".to_string());

        let config = Config::from_source(&vars).unwrap();
        assert_eq!(config.pixie_api_url, "http://localhost:9000");
        assert_eq!(config.slack_api_url, "http://localhost:9001/api");
        assert_eq!(config.script_path, "/etc/sqlwatch/query.pxl");
        assert!(config.notify_on_failure);
    }

    #[test]
    fn test_invalid_bool() {
        let mut vars = complete_env();
        vars.insert(NOTIFY_ON_FAILURE.to_string(), "sometimes".to_string());

        assert!(matches!(
            Config::from_source(&vars),
            Err(ConfigError::Invalid { key: NOTIFY_ON_FAILURE, .. })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_source(&complete_env()).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("px-api-key"));
        assert!(!debug.contains("xoxb-token"));
        assert!(debug.contains("cluster-1"));
    }
}
