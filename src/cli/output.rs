//! Output formatting for scan reports and health checks
//!
//! JSON and YAML print the report exactly as the web service would return it;
//! the human format prints the severity summary followed by one line per finding.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

use crate::scan::{Finding, ScanReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

/// Result of probing the scanner binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub scanner: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &ScanReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize scan report to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize scan report to YAML")
            }
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_health(&self, status: &HealthStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(status)
                .context("Failed to serialize health status to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(status).context("Failed to serialize health status to YAML")
            }
            OutputFormat::Human => Ok(self.format_health_human(status)),
        }
    }

    fn format_report_human(&self, report: &ScanReport) -> String {
        let mut out = String::new();

        if let Some(error) = report.error() {
            let _ = writeln!(out, "Error: {}", error);
            if let Some(raw) = report.get("raw_output").and_then(|v| v.as_str()) {
                if !raw.trim().is_empty() {
                    let _ = writeln!(out, "\nScanner output:\n{}", raw.trim_end());
                }
            }
        }

        let Some(counts) = report.summary() else {
            return out;
        };

        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "Summary");
        let _ = writeln!(out, "  HIGH:   {}", counts.high);
        let _ = writeln!(out, "  MEDIUM: {}", counts.medium);
        let _ = writeln!(out, "  LOW:    {}", counts.low);

        let findings = report.findings();
        if findings.is_empty() {
            if report.error().is_none() {
                let _ = writeln!(out, "\nNo issues found.");
            }
            return out;
        }

        let _ = writeln!(out, "\nFindings");
        for finding in &findings {
            let _ = writeln!(out, "  {}", format_finding(finding));
        }

        out
    }

    fn format_health_human(&self, status: &HealthStatus) -> String {
        if status.available {
            format!(
                "✓ {} available ({})",
                status.scanner,
                status.version.as_deref().unwrap_or("unknown version")
            )
        } else {
            format!(
                "✗ {} unavailable: {}",
                status.scanner,
                status.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

fn format_finding(finding: &Finding) -> String {
    let severity = finding.issue_severity.as_deref().unwrap_or("LOW");
    let location = match (&finding.filename, finding.line_number) {
        (Some(file), Some(line)) => format!("{}:{}", file, line),
        (Some(file), None) => file.clone(),
        (None, _) => "<unknown>".to_string(),
    };
    let test = finding.test_id.as_deref().unwrap_or("-");
    let text = finding.issue_text.as_deref().unwrap_or("");

    format!("[{:<6}] {} {} {}", severity, test, location, text)
        .trim_end()
        .to_string()
}
