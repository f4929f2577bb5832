//! The standard check catalog.
//!
//! | Context | Category  | Codes |
//! |---------|-----------|-------|
//! | table   | structure | `io-error`, `encoding-error`, `format-error`, `schema-error`, `source-error` |
//! | head    | structure | `blank-header`, `duplicate-header` |
//! | head    | schema    | `non-matching-header`, `extra-header`, `missing-header` |
//! | body    | structure | `blank-row`, `duplicate-row`, `extra-value`, `missing-value` |
//! | body    | schema    | `non-castable-value`, then the constraint checks |
//!
//! Catalog order is execution order. Checks that remove columns or cells
//! run before the checks that would otherwise report the same problem
//! twice: a blank row is never also reported as missing values, and a value
//! that cannot be cast is never tested against constraints.

mod body;
mod constraints;
mod head;
mod table;

use crate::core::{Check, CheckCategory};

pub use body::{blank_row, duplicate_row, extra_value, missing_value};
pub use constraints::{
    enumerable_constraint, maximum_constraint, maximum_length_constraint, minimum_constraint,
    minimum_length_constraint, non_castable_value, pattern_constraint, required_constraint,
    unique_constraint,
};
pub use head::{blank_header, duplicate_header, extra_header, missing_header, non_matching_header};
pub use table::{encoding_error, format_error, io_error, schema_error, source_error};

/// Returns the built-in checks in catalog order.
pub fn catalog() -> Vec<Check> {
    use CheckCategory::{Schema, Structure};

    vec![
        Check::table("io-error", Structure, io_error),
        Check::table("encoding-error", Structure, encoding_error),
        Check::table("format-error", Structure, format_error),
        Check::table("schema-error", Structure, schema_error),
        Check::table("source-error", Structure, source_error),
        Check::head("blank-header", Structure, blank_header),
        Check::head("duplicate-header", Structure, duplicate_header),
        Check::head("non-matching-header", Schema, non_matching_header),
        Check::head("extra-header", Schema, extra_header),
        Check::head("missing-header", Schema, missing_header),
        Check::body("blank-row", Structure, blank_row),
        Check::body("duplicate-row", Structure, duplicate_row),
        Check::body("extra-value", Structure, extra_value),
        Check::body("missing-value", Structure, missing_value),
        Check::body("non-castable-value", Schema, non_castable_value),
        Check::body("required-constraint", Schema, required_constraint)
            .requires(["non-castable-value"]),
        Check::body("unique-constraint", Schema, unique_constraint)
            .requires(["non-castable-value"]),
        Check::body("pattern-constraint", Schema, pattern_constraint)
            .requires(["non-castable-value"]),
        Check::body("enumerable-constraint", Schema, enumerable_constraint)
            .requires(["non-castable-value"]),
        Check::body("minimum-length-constraint", Schema, minimum_length_constraint)
            .requires(["non-castable-value"]),
        Check::body("maximum-length-constraint", Schema, maximum_length_constraint)
            .requires(["non-castable-value"]),
        Check::body("minimum-constraint", Schema, minimum_constraint)
            .requires(["non-castable-value"]),
        Check::body("maximum-constraint", Schema, maximum_constraint)
            .requires(["non-castable-value"]),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::{align_cells, align_columns, Cell, Column};
    use crate::schema::{Field, FieldDescriptor, SchemaField};
    use serde_json::Value;
    use std::sync::Arc;

    pub fn columns(headers: &[&str], fields: Vec<FieldDescriptor>) -> Vec<Column> {
        let headers: Vec<Option<String>> = headers
            .iter()
            .map(|h| (!h.is_empty()).then(|| h.to_string()))
            .collect();
        let fields: Vec<Arc<dyn Field>> = fields
            .into_iter()
            .map(|d| Arc::new(SchemaField::new(d).unwrap()) as Arc<dyn Field>)
            .collect();
        align_columns(&headers, &fields)
    }

    pub fn cells<'a>(columns: &'a [Column], row_number: usize, values: &'a [Value]) -> Vec<Cell<'a>> {
        align_cells(row_number, columns, columns.len(), values)
    }
}
