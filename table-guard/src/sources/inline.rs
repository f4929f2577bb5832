//! In-memory rows.

use super::{Row, RowStream, TableReader};
use crate::error::SourceError;
use serde_json::Value;
use std::sync::Arc;

/// A table held in memory, first row being the header by default.
#[derive(Debug, Clone)]
pub struct InlineReader {
    rows: Arc<Vec<Vec<Value>>>,
    has_header: bool,
}

impl InlineReader {
    /// Creates a reader over JSON value rows.
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self {
            rows: Arc::new(rows),
            has_header: true,
        }
    }

    /// Creates a reader from anything convertible to JSON values.
    pub fn from_rows<R, V>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Treats the first row as data.
    pub fn without_header(mut self) -> Self {
        self.has_header = false;
        self
    }
}

impl TableReader for InlineReader {
    fn open(&self) -> Result<Box<dyn RowStream>, SourceError> {
        let mut rows = self.rows.as_ref().clone().into_iter();
        let headers = if self.has_header {
            rows.next().map(|header| {
                header
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect()
            })
        } else {
            None
        };
        let position = usize::from(headers.is_some());
        Ok(Box::new(InlineRows {
            rows,
            headers,
            position,
        }))
    }

    fn description(&self) -> String {
        "inline".to_string()
    }
}

struct InlineRows {
    rows: std::vec::IntoIter<Vec<Value>>,
    headers: Option<Vec<String>>,
    position: usize,
}

impl RowStream for InlineRows {
    fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    fn next_row(&mut self) -> Option<Result<Row, SourceError>> {
        let values = self.rows.next()?;
        self.position += 1;
        Some(Ok(Row::new(self.position, values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_row_and_numbering() {
        let reader = InlineReader::new(vec![vec![json!("id"), json!(2)], vec![json!(1), json!("a")]]);
        let mut stream = reader.open().unwrap();
        assert_eq!(stream.headers(), Some(&["id".to_string(), "2".to_string()][..]));
        let row = stream.next_row().unwrap().unwrap();
        assert_eq!(row, Row::new(2, vec![json!(1), json!("a")]));
        assert!(stream.next_row().is_none());
    }

    #[test]
    fn test_without_header() {
        let reader = InlineReader::from_rows(vec![vec!["a"], vec!["b"]]).without_header();
        let mut stream = reader.open().unwrap();
        assert!(stream.headers().is_none());
        assert_eq!(stream.next_row().unwrap().unwrap().number, 1);
        assert_eq!(stream.next_row().unwrap().unwrap().number, 2);
    }

    #[test]
    fn test_reopen_starts_over() {
        let reader = InlineReader::from_rows(vec![vec!["id"], vec!["1"]]);
        for _ in 0..2 {
            let mut stream = reader.open().unwrap();
            assert_eq!(stream.next_row().unwrap().unwrap().values, vec![json!("1")]);
        }
    }
}
