//! Digest formatting for detected injections

use std::fmt::Display;

use crate::telemetry::{Row, TelemetryError};

/// First line of a digest that has findings
pub const HEADER: &str = "*Possible SQL injections detected in last 30 seconds*";

/// Whole digest when nothing was found
pub const NO_FINDINGS: &str = "*No SQL injections detected in last 30 seconds*";

/// One possible SQL injection reported by the stored script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule_broken: String,
    pub source: String,
    pub req_body: String,
}

impl Finding {
    pub fn new(
        rule_broken: impl Into<String>,
        source: impl Into<String>,
        req_body: impl Into<String>,
    ) -> Self {
        Self {
            rule_broken: rule_broken.into(),
            source: source.into(),
            req_body: req_body.into(),
        }
    }
}

impl TryFrom<&Row> for Finding {
    type Error = TelemetryError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            rule_broken: row.require("rule_broken")?.to_string(),
            source: row.require("source")?.to_string(),
            req_body: row.require("req_body")?.to_string(),
        })
    }
}

/// Build the chat message for one cycle's findings
///
/// Field values are inserted as-is; nothing is escaped.
pub fn format_digest(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return NO_FINDINGS.to_string();
    }

    let mut parts = Vec::with_capacity(findings.len() + 1);
    parts.push(HEADER.to_string());
    parts.extend(findings.iter().map(format_entry));
    parts.join("\n\n")
}

pub fn format_entry(finding: &Finding) -> String {
    format!(
        "Rule `{}` violated on `{}`\nSQL: `{}`",
        finding.rule_broken, finding.source, finding.req_body
    )
}

/// Message posted once when monitoring stops for good
pub fn format_stopped_notice(reason: &impl Display) -> String {
    format!("*SQL injection monitoring stopped: {}*", reason)
}
