//! Scanner report parsing and severity tallies
//!
//! Bandit's JSON is kept as an untyped [`serde_json::Value`] so every field it
//! emits reaches the page unchanged. The only addition is `summary_counts`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

pub const INVALID_ARCHIVE_MESSAGE: &str = "Invalid ZIP file";
pub const INVALID_OUTPUT_MESSAGE: &str = "Bandit failed to produce valid JSON";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    fn record(&mut self, severity: &str) {
        match severity {
            "HIGH" => self.high += 1,
            "MEDIUM" => self.medium += 1,
            "LOW" => self.low += 1,
            _ => {}
        }
    }
}

/// One entry of the scanner's `results` array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Finding {
    pub filename: Option<String>,
    pub line_number: Option<u64>,
    pub test_id: Option<String>,
    pub test_name: Option<String>,
    pub issue_severity: Option<String>,
    pub issue_confidence: Option<String>,
    pub issue_text: Option<String>,
    pub more_info: Option<String>,
}

/// Report rendered into the results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanReport(Map<String, Value>);

impl ScanReport {
    pub fn invalid_archive() -> Self {
        let mut map = Map::new();
        map.insert("error".to_string(), json!(INVALID_ARCHIVE_MESSAGE));
        Self(map)
    }

    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn is_invalid_archive(&self) -> bool {
        self.error() == Some(INVALID_ARCHIVE_MESSAGE)
    }

    pub fn summary(&self) -> Option<SeverityCounts> {
        self.0
            .get("summary_counts")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Typed view of `results`; malformed entries are dropped.
    pub fn findings(&self) -> Vec<Finding> {
        self.0
            .get("results")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Drops anything printed before the JSON document, such as progress bars.
pub fn clean_output(raw: &str) -> &str {
    match raw.find('{') {
        Some(start) => &raw[start..],
        None => raw,
    }
}

/// Tallies `results[].issue_severity`; a missing severity counts as LOW, a null
/// or non-string one is not counted.
pub fn severity_counts(report: &Map<String, Value>) -> SeverityCounts {
    let mut counts = SeverityCounts::default();

    if let Some(results) = report.get("results").and_then(Value::as_array) {
        for issue in results {
            let severity = match issue.get("issue_severity") {
                None => "LOW",
                Some(value) => value.as_str().unwrap_or_default(),
            };
            counts.record(severity);
        }
    }

    counts
}

/// Builds the page report from raw scanner stdout.
pub fn build_report(raw_output: &str) -> ScanReport {
    let cleaned = clean_output(raw_output);

    let mut map = match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(kind = value_kind(&other), "Scanner output is JSON but not an object");
            invalid_output(raw_output)
        }
        Err(e) => {
            warn!(error = %e, bytes = raw_output.len(), "Scanner output is not valid JSON");
            invalid_output(raw_output)
        }
    };

    let counts = severity_counts(&map);
    map.insert("summary_counts".to_string(), json!(counts));

    ScanReport(map)
}

fn invalid_output(raw_output: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("error".to_string(), json!(INVALID_OUTPUT_MESSAGE));
    map.insert("raw_output".to_string(), json!(raw_output));
    map
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
