//! CSV reader built on the `csv` crate.

use super::{Row, RowStream, TableReader};
use crate::error::SourceError;
use csv::{ByteRecord, ByteRecordsIntoIter, ReaderBuilder};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::PathBuf;
use tracing::debug;

/// Options for configuring CSV reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the first record is a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
        }
    }
}

#[derive(Debug, Clone)]
enum CsvLocation {
    Path(PathBuf),
    Text(String),
}

/// A CSV table read from a file or from text.
///
/// Records are read leniently: rows may have any number of values, which is
/// what lets the inspector report extra and missing values instead of
/// failing. Rows are numbered by record, the header being row 1.
///
/// # Examples
///
/// ```rust
/// use table_guard::sources::{CsvOptions, CsvReader};
///
/// let reader = CsvReader::new("data/users.tsv").with_options(CsvOptions {
///     delimiter: b'\t',
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone)]
pub struct CsvReader {
    location: CsvLocation,
    options: CsvOptions,
}

impl CsvReader {
    /// Creates a reader for a file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            location: CsvLocation::Path(path.into()),
            options: CsvOptions::default(),
        }
    }

    /// Creates a reader over in-memory text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            location: CsvLocation::Text(text.into()),
            options: CsvOptions::default(),
        }
    }

    /// Sets custom options.
    pub fn with_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the options.
    pub fn options(&self) -> &CsvOptions {
        &self.options
    }
}

impl TableReader for CsvReader {
    fn open(&self) -> Result<Box<dyn RowStream>, SourceError> {
        let input: Box<dyn Read + Send> = match &self.location {
            CsvLocation::Path(path) => Box::new(BufReader::new(File::open(path)?)),
            CsvLocation::Text(text) => Box::new(Cursor::new(text.clone().into_bytes())),
        };
        let mut records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .from_reader(input)
            .into_byte_records();

        let mut position = 0;
        let headers = if self.options.has_header {
            match records.next() {
                Some(record) => {
                    position = 1;
                    let mut headers = decode_strings(&record?, position)?;
                    if let Some(first) = headers.first_mut() {
                        if let Some(stripped) = first.strip_prefix('\u{feff}') {
                            *first = stripped.to_string();
                        }
                    }
                    Some(headers)
                }
                None => None,
            }
        } else {
            None
        };
        debug!(
            source = %self.description(),
            headers = ?headers,
            "Opened CSV table"
        );

        Ok(Box::new(CsvRows {
            records,
            headers,
            position,
        }))
    }

    fn description(&self) -> String {
        match &self.location {
            CsvLocation::Path(path) => path.display().to_string(),
            CsvLocation::Text(_) => "inline CSV".to_string(),
        }
    }
}

struct CsvRows {
    records: ByteRecordsIntoIter<Box<dyn Read + Send>>,
    headers: Option<Vec<String>>,
    position: usize,
}

impl RowStream for CsvRows {
    fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    fn next_row(&mut self) -> Option<Result<Row, SourceError>> {
        let record = self.records.next()?;
        self.position += 1;
        let number = self.position;
        Some(
            record
                .map_err(SourceError::from)
                .and_then(|record| decode_strings(&record, number))
                .map(|values| Row::new(number, values.into_iter().map(Value::String).collect())),
        )
    }
}

fn decode_strings(record: &ByteRecord, number: usize) -> Result<Vec<String>, SourceError> {
    record
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            std::str::from_utf8(bytes).map(str::to_string).map_err(|e| {
                SourceError::Encoding(format!(
                    "row {number}, column {}: invalid UTF-8 ({e})",
                    index + 1
                ))
            })
        })
        .collect()
}
