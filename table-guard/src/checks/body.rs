//! Body-context structure checks.

use crate::core::{Cell, CheckState, Finding};
use serde_json::Value;

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Reports a row whose every value is empty, and drops its cells.
pub fn blank_row(cells: &mut Vec<Cell<'_>>, _state: &mut CheckState) -> Vec<Finding> {
    let Some(row_number) = cells.first().map(|c| c.row_number) else {
        return Vec::new();
    };
    if !cells.iter().all(|cell| is_blank(cell.value())) {
        return Vec::new();
    }
    cells.clear();
    vec![Finding::new(format!("Row {row_number} is completely blank")).at_row(row_number)]
}

/// Reports a row whose values repeat an earlier row, and drops its cells.
///
/// The state maps a row fingerprint to the row numbers that produced it.
pub fn duplicate_row(cells: &mut Vec<Cell<'_>>, state: &mut CheckState) -> Vec<Finding> {
    let Some(row_number) = cells.first().map(|c| c.row_number) else {
        return Vec::new();
    };
    let fingerprint = Value::Array(
        cells
            .iter()
            .map(|c| c.value().cloned().unwrap_or(Value::Null))
            .collect(),
    )
    .to_string();

    let rows = state
        .entry(fingerprint)
        .or_insert_with(|| Value::Array(Vec::new()));
    let Value::Array(rows) = rows else {
        return Vec::new();
    };
    let earlier: Vec<String> = rows.iter().map(Value::to_string).collect();
    rows.push(Value::from(row_number));
    if earlier.is_empty() {
        return Vec::new();
    }

    cells.clear();
    vec![Finding::new(format!(
        "Row {row_number} is duplicated to row(s) {}",
        earlier.join(", ")
    ))
    .at_row(row_number)]
}

/// Reports values beyond the table's columns, and drops them.
pub fn extra_value(cells: &mut Vec<Cell<'_>>, _state: &mut CheckState) -> Vec<Finding> {
    let mut findings = Vec::new();
    cells.retain(|cell| {
        if cell.column.is_some() {
            return true;
        }
        findings.push(
            Finding::new(format!(
                "Row {} has an extra value in column {}",
                cell.row_number, cell.column_number
            ))
            .at_row(cell.row_number)
            .at_column(cell.column_number),
        );
        false
    });
    findings
}

/// Reports columns the row is too short to fill, and drops their cells.
pub fn missing_value(cells: &mut Vec<Cell<'_>>, _state: &mut CheckState) -> Vec<Finding> {
    let mut findings = Vec::new();
    cells.retain(|cell| {
        if cell.value.is_some() {
            return true;
        }
        findings.push(
            Finding::new(format!(
                "Row {} has a missing value in column {}",
                cell.row_number, cell.column_number
            ))
            .at_row(cell.row_number)
            .at_column(cell.column_number),
        );
        false
    });
    findings
}
