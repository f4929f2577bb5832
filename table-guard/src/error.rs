//! Error types for the table-guard inspection engine.
//!
//! Errors are split by the point at which they can occur:
//!
//! - [`InspectorError`] is what the public API returns. Configuration
//!   variants are raised before any table is touched; `TableOpen` is raised
//!   when a table cannot be read and no table-context check recovers it.
//! - [`SourceError`] is produced by readers and schema acquisition. It is
//!   handed to table-context checks, which turn it into report issues.
//! - [`CastError`] is produced by fields and only ever becomes a
//!   `non-castable-value` issue.

use thiserror::Error;

/// The main error type for the table-guard library.
#[derive(Error, Debug)]
pub enum InspectorError {
    /// The requested profile is not registered.
    #[error("Profile \"{0}\" is not supported")]
    UnsupportedProfile(String),

    /// A check selection referenced a code that has no registered executable.
    #[error("Check \"{0}\" is not supported")]
    UnknownCheck(String),

    /// A resolved check requires a check that does not precede it.
    #[error("Check \"{code}\" requires all checks {requires:?} before")]
    UnsatisfiedDependency {
        /// Code of the check whose requirements are not met
        code: String,
        /// The codes it requires
        requires: Vec<String>,
    },

    /// A check with the same code is already registered.
    #[error("Check \"{0}\" is already registered")]
    DuplicateCheck(String),

    /// The check selection has a shape the registry cannot interpret.
    #[error("Checks config \"{0}\" is not supported")]
    UnsupportedCheckSelection(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A table could not be opened or read and no table check recovered it.
    #[error("Table '{table}' could not be read: {source}")]
    TableOpen {
        /// Description of the table that failed
        table: String,
        /// The reader-level failure
        #[source]
        source: SourceError,
    },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, InspectorError>`.
///
/// This is the standard `Result` type used throughout the library.
pub type Result<T> = std::result::Result<T, InspectorError>;

impl InspectorError {
    /// Creates an unsatisfied dependency error.
    pub fn unsatisfied_dependency(code: impl Into<String>, requires: &[String]) -> Self {
        Self::UnsatisfiedDependency {
            code: code.into(),
            requires: requires.to_vec(),
        }
    }

    /// Wraps a reader failure for the given table.
    pub fn table_open(table: impl Into<String>, source: SourceError) -> Self {
        Self::TableOpen {
            table: table.into(),
            source,
        }
    }

    /// Returns true for errors raised while validating configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedProfile(_)
                | Self::UnknownCheck(_)
                | Self::UnsatisfiedDependency { .. }
                | Self::DuplicateCheck(_)
                | Self::UnsupportedCheckSelection(_)
                | Self::Configuration(_)
        )
    }
}

impl From<serde_json::Error> for InspectorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A failure while acquiring or streaming a table.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The underlying file or stream could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes could not be decoded as text.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The text is not valid for the table format.
    #[error("Format error: {0}")]
    Format(String),

    /// The schema could not be loaded or inferred.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Any other source-level failure.
    #[error("Source error: {0}")]
    Source(String),
}

impl SourceError {
    /// Returns a short, stable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Encoding(_) => "encoding",
            Self::Format(_) => "format",
            Self::Schema(_) => "schema",
            Self::Source(_) => "source",
        }
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => Self::Io(io),
            csv::ErrorKind::Utf8 { .. } => Self::Encoding(message),
            _ => Self::Format(message),
        }
    }
}

/// A value could not be cast to a field's type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Value {value} is not castable to type \"{field_type}\" (format \"{format}\")")]
pub struct CastError {
    /// The raw value, rendered for display
    pub value: String,
    /// The field type that was attempted
    pub field_type: String,
    /// The field format that was attempted
    pub format: String,
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<InspectorError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            InspectorError::Configuration(inner) => {
                InspectorError::Configuration(format!("{msg}: {inner}"))
            }
            other => InspectorError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                InspectorError::Configuration(inner) => {
                    InspectorError::Configuration(format!("{msg}: {inner}"))
                }
                other => InspectorError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}
