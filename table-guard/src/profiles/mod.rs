//! Profiles: expansion of a source locator into tables.
//!
//! A profile turns one `source` string into a lazy sequence of tables, each
//! with metadata merged into its report. The inspector pulls at most
//! `table-limit` entries and drops the iterator, so a profile may describe
//! an arbitrarily large dataset. Items that fail become report warnings.
//!
//! Built-in profiles:
//!
//! | Name          | Source                     | Options |
//! |---------------|----------------------------|---------|
//! | `table`       | a CSV file path            | `schema`, `delimiter`, `headers` |
//! | `datapackage` | a `datapackage.json` path  | none |
//! | `glob`        | a glob pattern of CSV files| `schema`, `delimiter`, `headers` |
//!
//! Any `Fn(&str, &ProfileOptions) -> TableIter` is a profile too:
//!
//! ```rust
//! use table_guard::profiles::{ProfileOptions, ProfileRegistry, TableEntry, TableIter};
//! use table_guard::sources::{CsvReader, Table};
//!
//! let mut profiles = ProfileRegistry::builtin();
//! profiles.register("lines", |source: &str, _options: &ProfileOptions| -> TableIter {
//!     let tables: Vec<_> = source
//!         .lines()
//!         .map(|path| Ok(TableEntry::new(Table::new(CsvReader::new(path)))))
//!         .collect();
//!     Box::new(tables.into_iter())
//! });
//! assert!(profiles.get("lines").is_some());
//! ```

mod datapackage;
mod glob;
mod table;

pub use self::datapackage::DataPackageProfile;
pub use self::glob::GlobProfile;
pub use self::table::TableProfile;

use crate::error::SourceError;
use crate::schema::SchemaSource;
use crate::sources::{CsvOptions, Table};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Profile-specific options, as a JSON object.
pub type ProfileOptions = Map<String, Value>;

/// The lazy table sequence a profile produces.
pub type TableIter = Box<dyn Iterator<Item = Result<TableEntry, SourceError>> + Send>;

/// Name of the profile used when none is given.
pub const DEFAULT_PROFILE: &str = "table";

/// A table plus the metadata its report is extended with.
#[derive(Debug)]
pub struct TableEntry {
    pub table: Table,
    pub extra: Map<String, Value>,
}

impl TableEntry {
    /// Creates an entry with no metadata.
    pub fn new(table: Table) -> Self {
        Self {
            table,
            extra: Map::new(),
        }
    }

    /// Adds a metadata key.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Expands a source locator into tables.
pub trait Profile: Send + Sync {
    fn tables(&self, source: &str, options: &ProfileOptions) -> TableIter;
}

impl<F> Profile for F
where
    F: Fn(&str, &ProfileOptions) -> TableIter + Send + Sync,
{
    fn tables(&self, source: &str, options: &ProfileOptions) -> TableIter {
        self(source, options)
    }
}

/// Profiles by name.
#[derive(Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, Arc<dyn Profile>>,
}

impl ProfileRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the `table`, `datapackage` and `glob` profiles.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("table", TableProfile);
        registry.register("datapackage", DataPackageProfile);
        registry.register("glob", GlobProfile);
        registry
    }

    /// Registers a profile, replacing any profile of the same name.
    pub fn register(&mut self, name: impl Into<String>, profile: impl Profile + 'static) {
        self.profiles.insert(name.into(), Arc::new(profile));
    }

    /// Returns the profile registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Profile>> {
        self.profiles.get(name).cloned()
    }

    /// Returns the registered names in order.
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for ProfileRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileRegistry")
            .field("profiles", &self.names())
            .finish()
    }
}

/// Reads the `delimiter` and `headers` options.
pub(crate) fn csv_options(options: &ProfileOptions) -> Result<CsvOptions, SourceError> {
    let mut csv = CsvOptions::default();
    if let Some(delimiter) = options.get("delimiter") {
        csv.delimiter = match delimiter.as_str().map(str::as_bytes) {
            Some([byte]) => *byte,
            _ => {
                return Err(SourceError::Source(format!(
                    "delimiter must be a single byte character, got {delimiter}"
                )))
            }
        };
    }
    if let Some(headers) = options.get("headers") {
        csv.has_header = headers.as_bool().ok_or_else(|| {
            SourceError::Source(format!("headers must be a boolean, got {headers}"))
        })?;
    }
    Ok(csv)
}

/// Reads a schema option: a descriptor object or a path relative to `base`.
pub(crate) fn schema_source(value: Option<&Value>, base: Option<&Path>) -> SchemaSource {
    match value {
        Some(Value::String(path)) => SchemaSource::Path(match base {
            Some(base) => base.join(path),
            None => path.into(),
        }),
        Some(descriptor) => SchemaSource::Descriptor(descriptor.clone()),
        None => SchemaSource::Infer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::InlineReader;
    use serde_json::json;

    fn options(value: Value) -> ProfileOptions {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(
            ProfileRegistry::builtin().names(),
            vec!["datapackage", "glob", "table"]
        );
    }

    #[test]
    fn test_closure_profile() {
        let mut registry = ProfileRegistry::new();
        registry.register("inline", |_: &str, _: &ProfileOptions| -> TableIter {
            let entry = TableEntry::new(Table::new(InlineReader::from_rows(vec![vec!["a"]])))
                .with_extra("origin", "memory");
            Box::new(std::iter::once(Ok(entry)))
        });
        let profile = registry.get("inline").unwrap();
        let entries: Vec<_> = profile.tables("", &ProfileOptions::new()).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].as_ref().unwrap().extra["origin"],
            json!("memory")
        );
    }

    #[test]
    fn test_csv_options() {
        let csv = csv_options(&options(json!({"delimiter": ";", "headers": false}))).unwrap();
        assert_eq!(csv.delimiter, b';');
        assert!(!csv.has_header);

        assert!(csv_options(&options(json!({"delimiter": ";;"}))).is_err());
        assert!(csv_options(&options(json!({"headers": "yes"}))).is_err());
    }

    #[test]
    fn test_schema_source() {
        assert!(matches!(schema_source(None, None), SchemaSource::Infer));
        assert!(matches!(
            schema_source(Some(&json!({"fields": []})), None),
            SchemaSource::Descriptor(_)
        ));
        match schema_source(Some(&json!("schema.json")), Some(Path::new("/data"))) {
            SchemaSource::Path(path) => assert_eq!(path, Path::new("/data/schema.json")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
