//! Table readers and the streaming handle the inspector consumes.
//!
//! A [`TableReader`] knows how to open one table and yield raw rows. The
//! inspector never talks to a reader directly; it opens a [`TableStream`],
//! which reads the headers, buffers a sample for head checks and schema
//! inference, and then replays the sample followed by the rest of the rows.
//! Dropping the stream releases the underlying reader.
//!
//! Readers shipped with the crate:
//!
//! - [`CsvReader`]: delimited text from a file or an in-memory string
//! - [`InlineReader`]: rows held in memory as JSON values

use crate::error::SourceError;
use crate::schema::SchemaSource;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

mod csv;
mod inline;

pub use self::csv::{CsvOptions, CsvReader};
pub use self::inline::InlineReader;

/// One raw row with its 1-based position in the source.
///
/// Positions count the header row, so the first data row of a table with a
/// header is row 2.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub number: usize,
    pub values: Vec<Value>,
}

impl Row {
    /// Creates a row.
    pub fn new(number: usize, values: Vec<Value>) -> Self {
        Self { number, values }
    }
}

/// An opened table yielding rows one at a time.
pub trait RowStream: Send {
    /// Returns the header row, if the source has one.
    fn headers(&self) -> Option<&[String]>;

    /// Returns the next row, `None` at the end of the table.
    fn next_row(&mut self) -> Option<Result<Row, SourceError>>;
}

/// A source of one table.
///
/// # Examples
///
/// ```rust
/// use table_guard::sources::{CsvReader, TableReader};
///
/// let reader = CsvReader::from_text("id,name\n1,english\n");
/// let mut stream = reader.open().unwrap();
/// assert_eq!(stream.headers(), Some(&["id".to_string(), "name".to_string()][..]));
/// assert_eq!(stream.next_row().unwrap().unwrap().number, 2);
/// ```
pub trait TableReader: Debug + Send + Sync {
    /// Opens the table for reading.
    fn open(&self) -> Result<Box<dyn RowStream>, SourceError>;

    /// Returns a human-readable description of the table.
    fn description(&self) -> String;
}

/// A table handle: a reader plus where its schema comes from.
#[derive(Debug)]
pub struct Table {
    name: String,
    reader: Box<dyn TableReader>,
    schema: SchemaSource,
}

impl Table {
    /// Creates a table whose schema is inferred when needed.
    pub fn new(reader: impl TableReader + 'static) -> Self {
        Self {
            name: reader.description(),
            reader: Box::new(reader),
            schema: SchemaSource::Infer,
        }
    }

    /// Overrides the table name used in logs and errors.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets where the schema comes from.
    pub fn with_schema(mut self, schema: impl Into<SchemaSource>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the reader.
    pub fn reader(&self) -> &dyn TableReader {
        self.reader.as_ref()
    }

    /// Returns the schema source.
    pub fn schema(&self) -> &SchemaSource {
        &self.schema
    }
}

/// An opened table with its headers and sample buffered.
pub struct TableStream {
    inner: Box<dyn RowStream>,
    headers: Option<Vec<String>>,
    sample: Vec<Row>,
}

impl TableStream {
    /// Opens the reader and buffers up to `sample_size` rows.
    pub fn open(reader: &dyn TableReader, sample_size: usize) -> Result<Self, SourceError> {
        let mut inner = reader.open()?;
        let headers = inner.headers().map(<[String]>::to_vec);
        let mut sample = Vec::with_capacity(sample_size.min(1024));
        while sample.len() < sample_size {
            match inner.next_row() {
                Some(row) => sample.push(row?),
                None => break,
            }
        }
        Ok(Self {
            inner,
            headers,
            sample,
        })
    }

    /// Returns the header row, if any.
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// Returns the buffered sample rows.
    pub fn sample(&self) -> &[Row] {
        &self.sample
    }

    /// Returns the header slots the column model is built from.
    ///
    /// Without a header row this is one unnamed slot per value of the widest
    /// sample row.
    pub fn header_slots(&self) -> Vec<Option<String>> {
        match &self.headers {
            Some(headers) => headers.iter().cloned().map(Some).collect(),
            None => {
                let width = self.sample.iter().map(|r| r.values.len()).max();
                vec![None; width.unwrap_or(0)]
            }
        }
    }

    /// Consumes the stream, replaying the sample before the remaining rows.
    pub fn into_rows(self) -> Rows {
        Rows {
            sample: self.sample.into_iter(),
            inner: self.inner,
        }
    }
}

/// Every row of an opened table, in order.
pub struct Rows {
    sample: std::vec::IntoIter<Row>,
    inner: Box<dyn RowStream>,
}

impl Iterator for Rows {
    type Item = Result<Row, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.sample.next() {
            Some(row) => Some(Ok(row)),
            None => self.inner.next_row(),
        }
    }
}
