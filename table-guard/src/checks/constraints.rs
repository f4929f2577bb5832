//! Body-context schema checks: casting and field constraints.
//!
//! These only act on cells that have a header, a field and a value.
//! `non-castable-value` replaces each value with its cast, so the
//! constraint checks after it test typed values.

use crate::core::{Cell, CheckState, Finding};
use crate::schema::ConstraintKind;
use serde_json::Value;
use std::borrow::Cow;

pub fn non_castable_value(cells: &mut Vec<Cell<'_>>, _state: &mut CheckState) -> Vec<Finding> {
    let mut findings = Vec::new();
    cells.retain_mut(|cell| {
        let Some((field, value)) = cell.schema_target() else {
            return true;
        };
        match field.cast_value(value, true) {
            Ok(cast) => {
                cell.value = Some(Cow::Owned(cast));
                true
            }
            Err(_) => {
                findings.push(
                    Finding::new(format!(
                        "Row {} has non castable value in column {} (type: \"{}\", format: \"{}\")",
                        cell.row_number,
                        cell.column_number,
                        field.field_type(),
                        field.format()
                    ))
                    .at_row(cell.row_number)
                    .at_column(cell.column_number),
                );
                false
            }
        }
    });
    findings
}

pub fn required_constraint(cells: &mut Vec<Cell<'_>>, _state: &mut CheckState) -> Vec<Finding> {
    test_constraint(cells, ConstraintKind::Required, true)
}

/// Reports a value already seen in the same column of an earlier row.
///
/// Missing values are never duplicates. The state maps a column and value
/// to the first row holding it.
pub fn unique_constraint(cells: &mut Vec<Cell<'_>>, state: &mut CheckState) -> Vec<Finding> {
    let mut findings = Vec::new();
    for cell in cells.iter() {
        let Some((field, value)) = cell.schema_target() else {
            continue;
        };
        if value.is_null() || !field.has_constraint(ConstraintKind::Unique) {
            continue;
        }
        let key = format!("{}:{}", cell.column_number, value);
        match state.get(&key) {
            Some(first) => findings.push(
                Finding::new(format!(
                    "Rows {}, {} has unique constraint violation in column {}",
                    first, cell.row_number, cell.column_number
                ))
                .at_row(cell.row_number)
                .at_column(cell.column_number),
            ),
            None => {
                state.insert(key, Value::from(cell.row_number));
            }
        }
    }
    findings
}

pub fn pattern_constraint(cells: &mut Vec<Cell<'_>>, _state: &mut CheckState) -> Vec<Finding> {
    test_constraint(cells, ConstraintKind::Pattern, false)
}

pub fn enumerable_constraint(cells: &mut Vec<Cell<'_>>, _state: &mut CheckState) -> Vec<Finding> {
    test_constraint(cells, ConstraintKind::Enum, false)
}

pub fn minimum_length_constraint(
    cells: &mut Vec<Cell<'_>>,
    _state: &mut CheckState,
) -> Vec<Finding> {
    test_constraint(cells, ConstraintKind::MinLength, false)
}

pub fn maximum_length_constraint(
    cells: &mut Vec<Cell<'_>>,
    _state: &mut CheckState,
) -> Vec<Finding> {
    test_constraint(cells, ConstraintKind::MaxLength, false)
}

pub fn minimum_constraint(cells: &mut Vec<Cell<'_>>, _state: &mut CheckState) -> Vec<Finding> {
    test_constraint(cells, ConstraintKind::Minimum, false)
}

pub fn maximum_constraint(cells: &mut Vec<Cell<'_>>, _state: &mut CheckState) -> Vec<Finding> {
    test_constraint(cells, ConstraintKind::Maximum, false)
}

fn constraint_name(kind: ConstraintKind) -> &'static str {
    match kind {
        ConstraintKind::Required => "required",
        ConstraintKind::Unique => "unique",
        ConstraintKind::MinLength => "minimum length",
        ConstraintKind::MaxLength => "maximum length",
        ConstraintKind::Minimum => "minimum",
        ConstraintKind::Maximum => "maximum",
        ConstraintKind::Pattern => "pattern",
        ConstraintKind::Enum => "enumerable",
    }
}

fn test_constraint(cells: &mut Vec<Cell<'_>>, kind: ConstraintKind, remove: bool) -> Vec<Finding> {
    let mut findings = Vec::new();
    cells.retain(|cell| {
        let Some((field, value)) = cell.schema_target() else {
            return true;
        };
        if field.test_value(value, kind) {
            return true;
        }
        findings.push(
            Finding::new(format!(
                "Row {} has {} constraint violation in column {}",
                cell.row_number,
                constraint_name(kind),
                cell.column_number
            ))
            .at_row(cell.row_number)
            .at_column(cell.column_number),
        );
        !remove
    });
    findings
}
