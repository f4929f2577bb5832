//! Inspection reports.
//!
//! Reports serialize to the conventional JSON shape with kebab-case keys:
//!
//! ```text
//! InspectionReport { time, valid, error-count, table-count, tables, warnings }
//!     └── TableReport { time, valid, error-count, row-count, headers, errors, ..metadata }
//!             └── Issue { code, message, row, row-number, column-number }
//! ```

use super::check::Finding;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

/// Keys of a table report that metadata may not overwrite.
const RESERVED_KEYS: [&str; 6] = [
    "time",
    "valid",
    "error-count",
    "row-count",
    "headers",
    "errors",
];

/// A single problem found in a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Issue {
    /// Code of the check that reported the issue
    pub code: String,
    /// Human-readable description
    pub message: String,
    /// Raw values of the offending row, for body issues
    pub row: Option<Vec<Value>>,
    pub row_number: Option<usize>,
    pub column_number: Option<usize>,
}

impl Issue {
    /// Stamps a finding with the code of the check that produced it.
    pub fn from_finding(code: &str, finding: Finding, row: Option<Vec<Value>>) -> Self {
        Self {
            code: code.to_string(),
            message: finding.message,
            row,
            row_number: finding.row_number,
            column_number: finding.column_number,
        }
    }
}

/// The result of inspecting one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TableReport {
    /// Wall-clock seconds, rounded to milliseconds
    pub time: f64,
    pub valid: bool,
    pub error_count: usize,
    /// Number of data rows processed
    pub row_count: usize,
    pub headers: Option<Vec<String>>,
    pub errors: Vec<Issue>,
    /// Extra keys supplied by the profile, e.g. `datapackage`
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl TableReport {
    /// Builds a report from the issues left after truncation.
    pub fn new(
        elapsed: Duration,
        headers: Option<Vec<String>>,
        row_count: usize,
        errors: Vec<Issue>,
    ) -> Self {
        Self {
            time: round_seconds(elapsed),
            valid: errors.is_empty(),
            error_count: errors.len(),
            row_count,
            headers,
            errors,
            metadata: Map::new(),
        }
    }

    /// Merges profile metadata into the report. Reserved keys are skipped.
    pub fn merge_metadata(&mut self, metadata: Map<String, Value>) {
        for (key, value) in metadata {
            if RESERVED_KEYS.contains(&key.as_str()) {
                warn!(metadata.key = %key, "Ignoring metadata key that shadows a report field");
                continue;
            }
            self.metadata.insert(key, value);
        }
    }
}

/// The result of one inspection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InspectionReport {
    pub time: f64,
    /// True if every table report is valid and the source expanded cleanly
    pub valid: bool,
    /// Total issues across tables
    pub error_count: usize,
    pub table_count: usize,
    pub tables: Vec<TableReport>,
    /// Problems met while expanding the source into tables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl InspectionReport {
    /// Aggregates table reports, preserving their order.
    ///
    /// A report with warnings is invalid: some part of the source could not
    /// be turned into a table.
    pub fn new(elapsed: Duration, tables: Vec<TableReport>, warnings: Vec<String>) -> Self {
        Self {
            time: round_seconds(elapsed),
            valid: warnings.is_empty() && tables.iter().all(|t| t.valid),
            error_count: tables.iter().map(|t| t.error_count).sum(),
            table_count: tables.len(),
            tables,
            warnings,
        }
    }

    /// Flattens issues to `(table index, row number, column number, code)`
    /// tuples in report order.
    pub fn summary(&self) -> Vec<(usize, Option<usize>, Option<usize>, &str)> {
        self.tables
            .iter()
            .enumerate()
            .flat_map(|(index, table)| {
                table.errors.iter().map(move |issue| {
                    (
                        index,
                        issue.row_number,
                        issue.column_number,
                        issue.code.as_str(),
                    )
                })
            })
            .collect()
    }
}

fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}
