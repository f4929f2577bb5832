//! Column model and per-row cell alignment.
//!
//! Head checks see the column model; body checks see the cells of one row.
//! Both are positional: a column keeps the 1-based position it had in the
//! source even after other columns are removed, and a row's values are
//! matched to columns by that position.

use crate::schema::Field;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// One column of a table: header slot and field slot at a fixed position.
#[derive(Debug, Clone)]
pub struct Column {
    pub position: usize,
    pub header: Option<String>,
    pub field: Option<Arc<dyn Field>>,
}

impl Column {
    /// Returns the field name, if the column has a field.
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref().map(|f| f.name())
    }
}

/// One value of a row, aligned to a column.
///
/// A cell with no column holds a value beyond the table's width; a cell with
/// no value belongs to a column the row is too short to fill.
#[derive(Debug, Clone)]
pub struct Cell<'a> {
    pub row_number: usize,
    pub column_number: usize,
    pub column: Option<&'a Column>,
    pub value: Option<Cow<'a, Value>>,
}

impl<'a> Cell<'a> {
    /// Returns the column header.
    pub fn header(&self) -> Option<&'a str> {
        self.column.and_then(|c| c.header.as_deref())
    }

    /// Returns the column field.
    pub fn field(&self) -> Option<&'a dyn Field> {
        self.column.and_then(|c| c.field.as_deref())
    }

    /// Returns the value.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_deref()
    }

    /// Returns the field and value of a cell that has a header, a field and
    /// a value. Schema checks act on these cells only.
    pub fn schema_target(&self) -> Option<(&'a dyn Field, &Value)> {
        self.header()?;
        Some((self.field()?, self.value()?))
    }
}

/// Zips header and field slots into columns.
///
/// The result is as long as the longer input; positions start at 1.
pub fn align_columns(headers: &[Option<String>], fields: &[Arc<dyn Field>]) -> Vec<Column> {
    let width = headers.len().max(fields.len());
    (0..width)
        .map(|index| Column {
            position: index + 1,
            header: headers.get(index).cloned().flatten(),
            field: fields.get(index).cloned(),
        })
        .collect()
}

/// Aligns a row's values to the surviving columns.
///
/// `width` is the number of columns before head checks ran. Every surviving
/// column gets a cell holding the value at its position, if any. Values past
/// `width` get cells with no column. Cells are ordered by column number.
pub fn align_cells<'a>(
    row_number: usize,
    columns: &'a [Column],
    width: usize,
    values: &'a [Value],
) -> Vec<Cell<'a>> {
    let extra = values.len().saturating_sub(width);
    let mut cells = Vec::with_capacity(columns.len() + extra);
    cells.extend(columns.iter().map(|column| Cell {
        row_number,
        column_number: column.position,
        column: Some(column),
        value: column
            .position
            .checked_sub(1)
            .and_then(|index| values.get(index))
            .map(Cow::Borrowed),
    }));
    cells.extend(
        values
            .iter()
            .enumerate()
            .skip(width)
            .map(|(index, value)| Cell {
                row_number,
                column_number: index + 1,
                column: None,
                value: Some(Cow::Borrowed(value)),
            }),
    );
    cells
}
