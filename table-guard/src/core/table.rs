//! Single-table inspection.
//!
//! A table moves through `Opening → (FatalError | HeadChecking) →
//! BodyChecking → Closed`. Every phase appends to one issue buffer, which is
//! truncated to the error limit when the table closes.

use super::alignment::{align_cells, align_columns, Column};
use super::check::{CheckCategory, CheckState};
use super::registry::ResolvedChecks;
use super::report::{Issue, TableReport};
use crate::error::{InspectorError, Result, SourceError};
use crate::logging::{truncate_field, LogConfig};
use crate::schema::Schema;
use crate::sources::{Row, Rows, Table, TableStream};
use crate::{log_check, log_table_op, perf_debug};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Termination controls for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Row position at which streaming stops; that row is not processed
    pub row_limit: usize,
    /// Issue count at which streaming stops and to which issues are truncated
    pub error_limit: usize,
    /// Rows buffered when the table is opened
    pub sample_size: usize,
}

/// Runs one table through the resolved checks.
///
/// # Examples
///
/// ```rust
/// use table_guard::core::{CheckRegistry, CheckSelection, Limits, TableInspector};
/// use table_guard::sources::{CsvReader, Table};
///
/// let checks = CheckRegistry::builtin().resolve(&CheckSelection::All).unwrap();
/// let limits = Limits { row_limit: 1000, error_limit: 1000, sample_size: 100 };
/// let table = Table::new(CsvReader::from_text("id,name\n1,english\n,\n"));
///
/// let report = TableInspector::new(&checks, limits).inspect(&table).unwrap();
/// assert_eq!(report.errors[0].code, "blank-row");
/// ```
pub struct TableInspector<'a> {
    checks: &'a ResolvedChecks,
    limits: Limits,
    log: LogConfig,
}

struct Opened {
    stream: TableStream,
    slots: Vec<Option<String>>,
    schema: Option<Schema>,
}

impl<'a> TableInspector<'a> {
    pub fn new(checks: &'a ResolvedChecks, limits: Limits) -> Self {
        Self {
            checks,
            limits,
            log: LogConfig::default(),
        }
    }

    /// Sets the logging configuration.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Inspects a table and produces its report.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::TableOpen`] when the table cannot be opened
    /// or read and no table-context check reports the failure.
    #[instrument(skip(self, table), fields(table = %table.name()))]
    pub fn inspect(&self, table: &Table) -> Result<TableReport> {
        let start = Instant::now();
        let mut issues = Vec::new();
        let mut headers = None;
        let mut row_count = 0;

        match self.open(table) {
            Err(error) => self.recover(table, error, &mut issues)?,
            Ok(opened) => {
                headers = opened.stream.headers().map(<[String]>::to_vec);
                let fields = opened.schema.as_ref().map(Schema::fields).unwrap_or(&[]);
                let mut columns = align_columns(&opened.slots, fields);
                let width = columns.len();

                self.check_head(&mut columns, opened.stream.sample(), &mut issues);
                if issues.len() < self.limits.error_limit {
                    row_count = self.check_body(
                        table,
                        opened.stream.into_rows(),
                        &columns,
                        width,
                        &mut issues,
                    )?;
                } else {
                    debug!(issues = issues.len(), "Error limit reached in head checks");
                }
            }
        }

        issues.truncate(self.limits.error_limit);
        let report = TableReport::new(start.elapsed(), headers, row_count, issues);
        log_table_op!(
            self.log,
            table = %table.name(),
            table.valid = report.valid,
            table.rows = report.row_count,
            table.errors = report.error_count,
            table.time = report.time,
            "Table inspected"
        );
        Ok(report)
    }

    fn open(&self, table: &Table) -> std::result::Result<Opened, SourceError> {
        let stream = TableStream::open(table.reader(), self.limits.sample_size)?;
        let slots = stream.header_slots();
        let schema = if self.checks.has_category(CheckCategory::Schema) {
            Some(table.schema().resolve(&slots, stream.sample())?)
        } else {
            None
        };
        debug!(
            headers = ?stream.headers(),
            sample = stream.sample().len(),
            fields = schema.as_ref().map(|s| s.fields().len()),
            "Table opened"
        );
        Ok(Opened {
            stream,
            slots,
            schema,
        })
    }

    // Runs table checks on a source failure; re-raises when none of them
    // reports it.
    fn recover(&self, table: &Table, error: SourceError, issues: &mut Vec<Issue>) -> Result<()> {
        let before = issues.len();
        for (code, check) in self.checks.table_checks() {
            issues.extend(
                check(&error)
                    .into_iter()
                    .map(|finding| Issue::from_finding(code, finding, None)),
            );
        }
        if issues.len() == before {
            return Err(InspectorError::table_open(table.name(), error));
        }
        warn!(
            error.kind = error.kind(),
            error.message = %error,
            issues = issues.len() - before,
            "Table could not be read"
        );
        Ok(())
    }

    fn check_head(&self, columns: &mut Vec<Column>, sample: &[Row], issues: &mut Vec<Issue>) {
        for (code, check) in self.checks.head_checks() {
            let findings = check(columns, sample);
            log_check!(
                self.log,
                check.code = code,
                findings = findings.len(),
                columns = columns.len(),
                "Head check finished"
            );
            issues.extend(
                findings
                    .into_iter()
                    .map(|finding| Issue::from_finding(code, finding, None)),
            );
        }
    }

    fn check_body(
        &self,
        table: &Table,
        rows: Rows,
        columns: &[Column],
        width: usize,
        issues: &mut Vec<Issue>,
    ) -> Result<usize> {
        let checks: Vec<_> = self.checks.body_checks().collect();
        let mut states: Vec<CheckState> = checks.iter().map(|_| CheckState::default()).collect();
        let mut row_count = 0;

        for row in rows {
            let row = match row {
                Ok(row) => row,
                Err(error) => {
                    self.recover(table, error, issues)?;
                    break;
                }
            };
            if row.number >= self.limits.row_limit {
                debug!(row = row.number, "Row limit reached");
                break;
            }
            row_count += 1;

            let mut cells = align_cells(row.number, columns, width, &row.values);
            for ((code, check), state) in checks.iter().zip(states.iter_mut()) {
                if cells.is_empty() {
                    break;
                }
                let findings = check(&mut cells, state);
                if findings.is_empty() {
                    continue;
                }
                if self.log.log_check_details {
                    let values = truncate_field(
                        &Value::from(row.values.clone()).to_string(),
                        self.log.max_field_length,
                    );
                    log_check!(
                        self.log,
                        check.code = *code,
                        row = row.number,
                        findings = findings.len(),
                        values = %values,
                        "Body check reported issues"
                    );
                }
                issues.extend(findings.into_iter().map(|mut finding| {
                    finding.row_number.get_or_insert(row.number);
                    Issue::from_finding(code, finding, Some(row.values.clone()))
                }));
            }

            perf_debug!(
                self.log,
                row = row.number,
                issues = issues.len(),
                "Row checked"
            );
            if issues.len() >= self.limits.error_limit {
                debug!(row = row.number, issues = issues.len(), "Error limit reached");
                break;
            }
        }
        Ok(row_count)
    }
}
