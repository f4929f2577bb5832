//! Prelude for commonly used types and traits in table-guard.

pub use crate::core::{
    Check, CheckCategory, CheckSelection, Finding, InspectionReport, Inspector, InspectorConfig,
    Issue, TableReport,
};
pub use crate::error::{ErrorContext, InspectorError, Result};
pub use crate::logging::LogConfig;
pub use crate::profiles::{ProfileOptions, TableEntry, TableIter};
pub use crate::sources::{CsvReader, InlineReader, Table};
