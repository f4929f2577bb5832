//! Check descriptors and the contracts of their executables.

use super::alignment::{Cell, Column};
use crate::error::{InspectorError, SourceError};
use crate::sources::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// What a check validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckCategory {
    /// Shape of the table: headers, row widths, blank and duplicate rows
    Structure,
    /// Agreement with the table schema
    Schema,
}

impl CheckCategory {
    /// Returns the string representation of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckCategory::Structure => "structure",
            CheckCategory::Schema => "schema",
        }
    }
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckCategory {
    type Err = InspectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "structure" => Ok(CheckCategory::Structure),
            "schema" => Ok(CheckCategory::Schema),
            other => Err(InspectorError::UnsupportedCheckSelection(other.to_string())),
        }
    }
}

/// The phase of table inspection a check runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckContext {
    /// Runs once when the table cannot be opened or read
    Table,
    /// Runs once against the column model and sample
    Head,
    /// Runs once per streamed row
    Body,
}

impl CheckContext {
    /// Returns the string representation of the context.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckContext::Table => "table",
            CheckContext::Head => "head",
            CheckContext::Body => "body",
        }
    }
}

impl fmt::Display for CheckContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem reported by a check, before the inspector stamps it with the
/// check code and row data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    pub row_number: Option<usize>,
    pub column_number: Option<usize>,
}

impl Finding {
    /// Creates a finding with no position.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            row_number: None,
            column_number: None,
        }
    }

    /// Sets the row number.
    pub fn at_row(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }

    /// Sets the column number.
    pub fn at_column(mut self, column_number: usize) -> Self {
        self.column_number = Some(column_number);
        self
    }
}

/// Check-private scratch space for one table.
///
/// A fresh state is created for every (table, body check) pair when the body
/// phase starts and is dropped when it ends. Keys are chosen by the check.
#[derive(Debug, Clone, Default)]
pub struct CheckState {
    entries: HashMap<String, Value>,
}

impl CheckState {
    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Stores a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Returns the entry for `key`.
    pub fn entry(&mut self, key: impl Into<String>) -> Entry<'_, String, Value> {
        self.entries.entry(key.into())
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Table-context executable: turns an acquisition failure into findings.
pub type TableCheckFn = dyn Fn(&SourceError) -> Vec<Finding> + Send + Sync;

/// Head-context executable: may shrink the column model in place.
pub type HeadCheckFn = dyn Fn(&mut Vec<Column>, &[Row]) -> Vec<Finding> + Send + Sync;

/// Body-context executable: may shrink or rewrite the row's cells in place.
pub type BodyCheckFn = dyn Fn(&mut Vec<Cell<'_>>, &mut CheckState) -> Vec<Finding> + Send + Sync;

/// The executable of a check. The variant fixes the check's context.
#[derive(Clone)]
pub enum Executable {
    Table(Arc<TableCheckFn>),
    Head(Arc<HeadCheckFn>),
    Body(Arc<BodyCheckFn>),
}

impl Executable {
    /// Returns the context this executable runs in.
    pub fn context(&self) -> CheckContext {
        match self {
            Executable::Table(_) => CheckContext::Table,
            Executable::Head(_) => CheckContext::Head,
            Executable::Body(_) => CheckContext::Body,
        }
    }
}

impl fmt::Debug for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Executable::{}", self.context())
    }
}

/// A registered check: a unique code, its category, the checks it must
/// follow and what it runs.
///
/// # Examples
///
/// ```rust
/// use table_guard::core::{Check, CheckCategory, CheckContext, Finding};
///
/// let check = Check::body("empty-first-cell", CheckCategory::Structure, |cells, _state| {
///     let blank = cells
///         .first()
///         .and_then(|cell| cell.value())
///         .map_or(false, |value| value == "");
///     if blank {
///         vec![Finding::new("First cell is empty")]
///     } else {
///         Vec::new()
///     }
/// })
/// .requires(["missing-value"]);
///
/// assert_eq!(check.context(), CheckContext::Body);
/// assert_eq!(check.required_codes(), &["missing-value".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct Check {
    code: String,
    category: CheckCategory,
    requires: Vec<String>,
    executable: Executable,
}

impl Check {
    /// Creates a table-context check.
    pub fn table<F>(code: impl Into<String>, category: CheckCategory, check: F) -> Self
    where
        F: Fn(&SourceError) -> Vec<Finding> + Send + Sync + 'static,
    {
        Self::with_executable(code, category, Executable::Table(Arc::new(check)))
    }

    /// Creates a head-context check.
    pub fn head<F>(code: impl Into<String>, category: CheckCategory, check: F) -> Self
    where
        F: Fn(&mut Vec<Column>, &[Row]) -> Vec<Finding> + Send + Sync + 'static,
    {
        Self::with_executable(code, category, Executable::Head(Arc::new(check)))
    }

    /// Creates a body-context check.
    pub fn body<F>(code: impl Into<String>, category: CheckCategory, check: F) -> Self
    where
        F: Fn(&mut Vec<Cell<'_>>, &mut CheckState) -> Vec<Finding> + Send + Sync + 'static,
    {
        Self::with_executable(code, category, Executable::Body(Arc::new(check)))
    }

    /// Creates a check from an executable.
    pub fn with_executable(
        code: impl Into<String>,
        category: CheckCategory,
        executable: Executable,
    ) -> Self {
        Self {
            code: code.into(),
            category,
            requires: Vec::new(),
            executable,
        }
    }

    /// Declares the checks that must run before this one.
    pub fn requires<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the check code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the check category.
    pub fn category(&self) -> CheckCategory {
        self.category
    }

    /// Returns the check context.
    pub fn context(&self) -> CheckContext {
        self.executable.context()
    }

    /// Returns the codes this check requires.
    pub fn required_codes(&self) -> &[String] {
        &self.requires
    }

    /// Returns the executable.
    pub fn executable(&self) -> &Executable {
        &self.executable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_follows_executable() {
        let table = Check::table("t", CheckCategory::Structure, |_| Vec::new());
        let head = Check::head("h", CheckCategory::Schema, |_, _| Vec::new());
        let body = Check::body("b", CheckCategory::Structure, |_, _| Vec::new());
        assert_eq!(table.context(), CheckContext::Table);
        assert_eq!(head.context(), CheckContext::Head);
        assert_eq!(body.context(), CheckContext::Body);
        assert_eq!(format!("{:?}", body.executable()), "Executable::body");
    }

    #[test]
    fn test_requires_builder_sets_required_codes() {
        let check = Check::body("unique-constraint", CheckCategory::Schema, |_, _| Vec::new())
            .requires(["non-castable-value"]);
        assert_eq!(check.required_codes(), &["non-castable-value".to_string()]);
        let plain = Check::body("blank-row", CheckCategory::Structure, |_, _| Vec::new());
        assert!(plain.required_codes().is_empty());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("schema".parse::<CheckCategory>().unwrap(), CheckCategory::Schema);
        assert!("format".parse::<CheckCategory>().is_err());
        assert_eq!(CheckCategory::Structure.to_string(), "structure");
    }

    #[test]
    fn test_finding_builder() {
        let finding = Finding::new("Row 2 is completely blank").at_row(2);
        assert_eq!(finding.row_number, Some(2));
        assert_eq!(finding.column_number, None);
    }

    #[test]
    fn test_check_state() {
        let mut state = CheckState::default();
        assert!(state.is_empty());
        state.insert("a", json!(1));
        state.entry("b").or_insert(json!([2]));
        assert_eq!(state.get("a"), Some(&json!(1)));
        assert_eq!(state.len(), 2);
    }
}
