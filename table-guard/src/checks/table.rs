//! Table-context checks: one per source error kind.

use crate::core::Finding;
use crate::error::SourceError;

pub fn io_error(error: &SourceError) -> Vec<Finding> {
    match error {
        SourceError::Io(e) => vec![Finding::new(format!(
            "Data reading error because of IO error: {e}"
        ))],
        _ => Vec::new(),
    }
}

pub fn encoding_error(error: &SourceError) -> Vec<Finding> {
    match error {
        SourceError::Encoding(e) => vec![Finding::new(format!(
            "Data reading error because of an encoding problem: {e}"
        ))],
        _ => Vec::new(),
    }
}

pub fn format_error(error: &SourceError) -> Vec<Finding> {
    match error {
        SourceError::Format(e) => vec![Finding::new(format!(
            "Data reading error because of incorrect format: {e}"
        ))],
        _ => Vec::new(),
    }
}

pub fn schema_error(error: &SourceError) -> Vec<Finding> {
    match error {
        SourceError::Schema(e) => vec![Finding::new(format!("Table Schema error: {e}"))],
        _ => Vec::new(),
    }
}

pub fn source_error(error: &SourceError) -> Vec<Finding> {
    match error {
        SourceError::Source(e) => vec![Finding::new(format!(
            "Data reading error because of not supported or inconsistent contents: {e}"
        ))],
        _ => Vec::new(),
    }
}
