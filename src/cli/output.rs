//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};
use tracing::error;

use crate::sakura::{ProvisionOutcome, ServerStatusReport, TeardownOutcome};
use crate::state::{ScriptRecord, ServerRecord};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Key/value row for table display.
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl FieldRow {
    fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result of `server start`.
    #[must_use]
    pub fn format_provision(&self, outcome: &ProvisionOutcome) -> String {
        match self.format {
            OutputFormat::Json => to_json(&ProvisionJson::from(outcome)),
            OutputFormat::Text => {
                let mut output = format!(
                    "{} Server created and started successfully\n\n",
                    "✓".green()
                );
                let mut rows = Self::record_rows(&outcome.record);
                rows.push(FieldRow::new(
                    "Startup script",
                    outcome
                        .script_id
                        .map_or_else(|| String::from("-"), |id| id.to_string()),
                ));
                rows.push(FieldRow::new(
                    "Completed",
                    outcome.completed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                ));
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');

                match outcome.record.ssh_command() {
                    Some(cmd) => {
                        let _ = write!(output, "\nConnect with: {}\n", cmd.cyan());
                    }
                    None => {
                        let _ = write!(
                            output,
                            "\n{} No IP address reported yet. Run 'server status' later.\n",
                            "!".yellow()
                        );
                    }
                }
                output
            }
        }
    }

    /// Formats the result of `server stop`.
    #[must_use]
    pub fn format_teardown(&self, outcome: &TeardownOutcome) -> String {
        match self.format {
            OutputFormat::Json => match outcome {
                TeardownOutcome::NoRecord => to_json(&serde_json::json!({
                    "status": "no_record",
                    "message": "No server record found",
                })),
                TeardownOutcome::Completed(record) => to_json(&serde_json::json!({
                    "status": "deleted",
                    "server_id": record.server_id,
                    "disk_id": record.disk_id,
                    "zone": record.zone,
                })),
            },
            OutputFormat::Text => match outcome {
                TeardownOutcome::NoRecord => format!(
                    "{} No server record found. Run 'server start' first.\n",
                    "!".yellow()
                ),
                TeardownOutcome::Completed(record) => format!(
                    "{} Server {} and disk {} deleted from zone {}\n",
                    "✓".green(),
                    record.server_id,
                    record.disk_id,
                    record.zone
                ),
            },
        }
    }

    /// Formats the result of `create-script`.
    #[must_use]
    pub fn format_script(&self, record: &ScriptRecord) -> String {
        match self.format {
            OutputFormat::Json => to_json(record),
            OutputFormat::Text => {
                let mut output = format!("{} Startup script created\n\n", "✓".green());
                let rows = vec![
                    FieldRow::new("Script ID", record.script_id.to_string()),
                    FieldRow::new("Name", record.script_name.clone()),
                    FieldRow::new("Zone", record.zone.clone()),
                ];
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');
                output
            }
        }
    }

    /// Formats the result of `server status`.
    #[must_use]
    pub fn format_status(&self, report: Option<&ServerStatusReport>) -> String {
        match (self.format, report) {
            (OutputFormat::Json, Some(report)) => to_json(report),
            (OutputFormat::Json, None) => to_json(&serde_json::json!({
                "status": "no_record",
                "message": "No server record found",
            })),
            (OutputFormat::Text, None) => format!(
                "{} No server record found. Run 'server start' first.\n",
                "!".yellow()
            ),
            (OutputFormat::Text, Some(report)) => {
                let mut rows = Self::record_rows(&report.record);
                rows.push(FieldRow::new(
                    "Instance status",
                    Self::format_instance_status(report.instance_status.as_deref()),
                ));
                rows.push(FieldRow::new(
                    "Current IP",
                    report.ip_address.clone().unwrap_or_else(|| String::from("-")),
                ));

                let mut output = String::from("\nServer status\n\n");
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');
                output
            }
        }
    }

    /// Formats non-fatal validation warnings.
    #[must_use]
    pub fn format_warnings(&self, warnings: &[String]) -> String {
        match self.format {
            OutputFormat::Json => String::new(),
            OutputFormat::Text => warnings.iter().fold(String::new(), |mut out, w| {
                let _ = writeln!(out, "{} {w}", "warning:".yellow());
                out
            }),
        }
    }

    fn record_rows(record: &ServerRecord) -> Vec<FieldRow> {
        vec![
            FieldRow::new("Server ID", record.server_id.to_string()),
            FieldRow::new("Disk ID", record.disk_id.to_string()),
            FieldRow::new(
                "IP address",
                record.ip_address.clone().unwrap_or_else(|| String::from("-")),
            ),
            FieldRow::new("Zone", record.zone.clone()),
        ]
    }

    fn format_instance_status(status: Option<&str>) -> String {
        match status {
            Some("up") => "up".green().to_string(),
            Some("down") => "down".red().to_string(),
            Some(other) => other.yellow().to_string(),
            None => String::from("unknown"),
        }
    }
}

/// Renders pretty JSON. A serialization failure is logged and yields empty output.
fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        error!("Failed to render JSON output: {e}");
        String::new()
    })
}

// JSON output structures

#[derive(Serialize)]
struct ProvisionJson<'a> {
    status: &'static str,
    #[serde(flatten)]
    record: &'a ServerRecord,
    script_id: Option<u64>,
    ssh_command: Option<String>,
    completed_at: DateTime<Utc>,
}

impl<'a> From<&'a ProvisionOutcome> for ProvisionJson<'a> {
    fn from(outcome: &'a ProvisionOutcome) -> Self {
        Self {
            status: "running",
            record: &outcome.record,
            script_id: outcome.script_id.map(|id| id.0),
            ssh_command: outcome.record.ssh_command(),
            completed_at: outcome.completed_at,
        }
    }
}
