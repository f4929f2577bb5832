use super::{csv_options, schema_source, Profile, ProfileOptions, TableEntry, TableIter};
use crate::error::SourceError;
use crate::schema::SchemaSource;
use crate::sources::{CsvOptions, CsvReader, Table};
use std::iter;
use std::path::PathBuf;

/// Every file matching a glob pattern, read as CSV.
///
/// Matches are produced lazily in the order the `glob` crate yields them
/// (alphabetical), so a table limit stops directory traversal early. Takes
/// the same options as the `table` profile, applied to every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobProfile;

impl Profile for GlobProfile {
    fn tables(&self, source: &str, options: &ProfileOptions) -> TableIter {
        let csv = match csv_options(options) {
            Ok(csv) => csv,
            Err(e) => return Box::new(iter::once(Err(e))),
        };
        let schema = schema_source(options.get("schema"), None);
        let paths = match glob::glob(source) {
            Ok(paths) => paths,
            Err(e) => {
                return Box::new(iter::once(Err(SourceError::Source(format!(
                    "Invalid glob pattern \"{source}\": {e}"
                )))))
            }
        };

        Box::new(paths.filter_map(move |item| match item {
            Ok(path) if path.is_dir() => None,
            Ok(path) => Some(Ok(entry(path, &csv, &schema))),
            Err(e) => Some(Err(SourceError::Io(e.into()))),
        }))
    }
}

fn entry(path: PathBuf, csv: &CsvOptions, schema: &SchemaSource) -> TableEntry {
    let source = path.display().to_string();
    let table = Table::new(CsvReader::new(path).with_options(csv.clone())).with_schema(schema.clone());
    TableEntry::new(table).with_extra("source", source)
}
