use super::{csv_options, schema_source, Profile, ProfileOptions, TableEntry, TableIter};
use crate::sources::{CsvReader, Table};
use std::iter;

/// One CSV file.
///
/// Options: `schema` (a descriptor object or a path), `delimiter` (a single
/// character) and `headers` (whether the first row is a header). The report
/// gets a `source` key holding the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableProfile;

impl Profile for TableProfile {
    fn tables(&self, source: &str, options: &ProfileOptions) -> TableIter {
        let entry = csv_options(options).map(|csv| {
            let table = Table::new(CsvReader::new(source).with_options(csv))
                .with_schema(schema_source(options.get("schema"), None));
            TableEntry::new(table).with_extra("source", source)
        });
        Box::new(iter::once(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaSource;
    use serde_json::json;

    #[test]
    fn test_single_table() {
        let mut options = ProfileOptions::new();
        options.insert("schema".to_string(), json!({"fields": [{"name": "id"}]}));
        let entries: Vec<_> = TableProfile.tables("data/valid.csv", &options).collect();
        assert_eq!(entries.len(), 1);

        let entry = entries.into_iter().next().unwrap().unwrap();
        assert_eq!(entry.table.name(), "data/valid.csv");
        assert_eq!(entry.extra["source"], json!("data/valid.csv"));
        assert!(matches!(entry.table.schema(), SchemaSource::Descriptor(_)));
    }

    #[test]
    fn test_bad_options_become_an_error_item() {
        let mut options = ProfileOptions::new();
        options.insert("delimiter".to_string(), json!(7));
        let entries: Vec<_> = TableProfile.tables("data/valid.csv", &options).collect();
        assert!(entries[0].is_err());
    }
}
