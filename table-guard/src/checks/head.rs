//! Head-context checks over the column model.
//!
//! The schema checks here remove the columns they report, so body checks
//! never see a column whose header and field disagree.

use crate::core::{Column, Finding};
use crate::sources::Row;
use std::collections::HashMap;

pub fn blank_header(columns: &mut Vec<Column>, _sample: &[Row]) -> Vec<Finding> {
    columns
        .iter()
        .filter(|c| matches!(c.header.as_deref(), Some(h) if h.trim().is_empty()))
        .map(|c| {
            Finding::new(format!("Header in column {} is blank", c.position)).at_column(c.position)
        })
        .collect()
}

pub fn duplicate_header(columns: &mut Vec<Column>, _sample: &[Row]) -> Vec<Finding> {
    let mut seen: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut findings = Vec::new();
    for column in columns.iter() {
        let Some(header) = column.header.as_deref().filter(|h| !h.trim().is_empty()) else {
            continue;
        };
        let positions = seen.entry(header).or_default();
        if !positions.is_empty() {
            let earlier: Vec<String> = positions.iter().map(usize::to_string).collect();
            findings.push(
                Finding::new(format!(
                    "Header in column {} is duplicated to header in column(s) {}",
                    column.position,
                    earlier.join(", ")
                ))
                .at_column(column.position),
            );
        }
        positions.push(column.position);
    }
    findings
}

pub fn non_matching_header(columns: &mut Vec<Column>, _sample: &[Row]) -> Vec<Finding> {
    let mut findings = Vec::new();
    columns.retain(|column| match (column.header.as_deref(), column.field_name()) {
        (Some(header), Some(name)) if header != name => {
            findings.push(
                Finding::new(format!(
                    "Header in column {} doesn't match field name \"{}\"",
                    column.position, name
                ))
                .at_column(column.position),
            );
            false
        }
        _ => true,
    });
    findings
}

pub fn extra_header(columns: &mut Vec<Column>, _sample: &[Row]) -> Vec<Finding> {
    let mut findings = Vec::new();
    columns.retain(|column| {
        if column.header.is_some() && column.field.is_none() {
            findings.push(
                Finding::new(format!(
                    "There is an extra header in column {}",
                    column.position
                ))
                .at_column(column.position),
            );
            return false;
        }
        true
    });
    findings
}

pub fn missing_header(columns: &mut Vec<Column>, _sample: &[Row]) -> Vec<Finding> {
    let mut findings = Vec::new();
    columns.retain(|column| {
        if column.header.is_none() && column.field.is_some() {
            findings.push(
                Finding::new(format!(
                    "There is a missing header in column {}",
                    column.position
                ))
                .at_column(column.position),
            );
            return false;
        }
        true
    });
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::columns;
    use crate::schema::{FieldDescriptor, FieldType};

    fn field(name: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, FieldType::String)
    }

    fn positions(findings: &[Finding]) -> Vec<Option<usize>> {
        findings.iter().map(|f| f.column_number).collect()
    }

    #[test]
    fn test_blank_header() {
        let mut cols = columns(&["id", " ", "name"], Vec::new());
        let findings = blank_header(&mut cols, &[]);
        assert_eq!(positions(&findings), vec![Some(2)]);
        assert_eq!(cols.len(), 3);
    }

    #[test]
    fn test_duplicate_header_keeps_columns() {
        let mut cols = columns(&["id", "name", "name", "name"], Vec::new());
        let findings = duplicate_header(&mut cols, &[]);
        assert_eq!(positions(&findings), vec![Some(3), Some(4)]);
        assert!(findings[1].message.ends_with("column(s) 2, 3"));
        assert_eq!(cols.len(), 4);
    }

    #[test]
    fn test_non_matching_header() {
        let mut cols = columns(&["name1", "name2", "name3"], vec![field("name1"), field("name2")]);
        assert!(non_matching_header(&mut cols, &[]).is_empty());
        assert_eq!(cols.len(), 3);

        let mut cols = columns(&["name1", "name2", "name3"], vec![field("name2"), field("name1")]);
        let findings = non_matching_header(&mut cols, &[]);
        assert_eq!(positions(&findings), vec![Some(1), Some(2)]);
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].position, 3);
    }

    #[test]
    fn test_extra_header() {
        let mut cols = columns(&["id", "name"], vec![field("id")]);
        let findings = extra_header(&mut cols, &[]);
        assert_eq!(positions(&findings), vec![Some(2)]);
        assert_eq!(cols.len(), 1);
    }

    #[test]
    fn test_missing_header() {
        let mut cols = columns(&["id"], vec![field("id"), field("name")]);
        let findings = missing_header(&mut cols, &[]);
        assert_eq!(positions(&findings), vec![Some(2)]);
        assert_eq!(findings[0].message, "There is a missing header in column 2");
        assert_eq!(cols.len(), 1);
    }
}
