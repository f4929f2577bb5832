use super::{schema_source, Profile, ProfileOptions, TableEntry, TableIter};
use crate::error::SourceError;
use crate::sources::{CsvOptions, CsvReader, InlineReader, Table};
use serde_json::{Map, Value};
use std::iter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The tabular resources of a Data Package descriptor.
///
/// A resource is tabular when it has a `schema` or declares the
/// `tabular-data-resource` profile; other resources are skipped silently.
/// Resource paths and schema paths are resolved against the descriptor's
/// directory. Inline `data` arrays are read in memory. Each report gets the
/// package name under `datapackage` and the resource name under
/// `resource-name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataPackageProfile;

impl Profile for DataPackageProfile {
    fn tables(&self, source: &str, _options: &ProfileOptions) -> TableIter {
        let descriptor = match read_descriptor(source) {
            Ok(descriptor) => descriptor,
            Err(e) => return Box::new(iter::once(Err(e))),
        };
        let base = Path::new(source).parent().map(Path::to_path_buf);
        let package = descriptor
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(source)
            .to_string();
        let resources = match descriptor.get("resources") {
            Some(Value::Array(resources)) => resources.clone(),
            _ => Vec::new(),
        };
        debug!(
            datapackage = %package,
            resources = resources.len(),
            "Expanding data package"
        );

        Box::new(
            resources
                .into_iter()
                .enumerate()
                .filter(|(_, resource)| is_tabular(resource))
                .map(move |(index, resource)| entry(&package, base.as_deref(), index, &resource)),
        )
    }
}

fn read_descriptor(source: &str) -> Result<Map<String, Value>, SourceError> {
    let text = std::fs::read_to_string(source).map_err(|e| {
        SourceError::Source(format!("Unable to read data package \"{source}\": {e}"))
    })?;
    match serde_json::from_str(&text) {
        Ok(Value::Object(descriptor)) => Ok(descriptor),
        Ok(_) => Err(SourceError::Source(format!(
            "Data package \"{source}\" must be a JSON object"
        ))),
        Err(e) => Err(SourceError::Source(format!(
            "Unable to parse JSON in \"{source}\": {e}"
        ))),
    }
}

fn is_tabular(resource: &Value) -> bool {
    resource.get("schema").is_some()
        || resource.get("profile").and_then(Value::as_str) == Some("tabular-data-resource")
}

fn entry(
    package: &str,
    base: Option<&Path>,
    index: usize,
    resource: &Value,
) -> Result<TableEntry, SourceError> {
    let name = resource
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("resource{}", index + 1));

    let table = match (resource.get("path"), resource.get("data")) {
        (Some(Value::String(path)), _) => {
            let reader = CsvReader::new(resolve(base, path)?).with_options(dialect(resource));
            Table::new(reader)
        }
        (Some(Value::Array(_)), _) => {
            return Err(SourceError::Source(format!(
                "Resource \"{name}\" has multiple paths, which is not supported"
            )))
        }
        (None, Some(Value::Array(rows))) => {
            let rows = rows
                .iter()
                .map(|row| match row {
                    Value::Array(values) => Ok(values.clone()),
                    _ => Err(SourceError::Format(format!(
                        "Resource \"{name}\" inline data must be an array of arrays"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Table::new(InlineReader::new(rows)).with_name(format!("{package}/{name}"))
        }
        _ => {
            return Err(SourceError::Source(format!(
                "Resource \"{name}\" has neither a path nor inline data"
            )))
        }
    };

    Ok(TableEntry::new(table.with_schema(schema_source(resource.get("schema"), base)))
        .with_extra("datapackage", package)
        .with_extra("resource-name", name))
}

fn resolve(base: Option<&Path>, path: &str) -> Result<PathBuf, SourceError> {
    if path.contains("://") {
        return Err(SourceError::Source(format!(
            "Remote resource \"{path}\" is not supported"
        )));
    }
    let path = Path::new(path);
    Ok(match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    })
}

fn dialect(resource: &Value) -> CsvOptions {
    let mut options = CsvOptions::default();
    let Some(dialect) = resource.get("dialect") else {
        return options;
    };
    if let Some([delimiter]) = dialect
        .get("delimiter")
        .and_then(Value::as_str)
        .map(str::as_bytes)
    {
        options.delimiter = *delimiter;
    }
    if let Some(header) = dialect.get("header").and_then(Value::as_bool) {
        options.has_header = header;
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaSource;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_package(dir: &TempDir, descriptor: &Value) -> String {
        let path = dir.path().join("datapackage.json");
        fs::write(&path, descriptor.to_string()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_tabular_resources_only() {
        let dir = TempDir::new().unwrap();
        let source = write_package(
            &dir,
            &json!({
                "name": "mixed",
                "resources": [
                    {"name": "readme", "path": "README.md"},
                    {"name": "cities", "path": "cities.csv", "schema": {"fields": [{"name": "city"}]}},
                    {"path": "people.csv", "profile": "tabular-data-resource", "schema": "people.json"}
                ]
            }),
        );

        let entries: Vec<_> = DataPackageProfile
            .tables(&source, &ProfileOptions::new())
            .map(Result::unwrap)
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].extra["datapackage"], json!("mixed"));
        assert_eq!(entries[0].extra["resource-name"], json!("cities"));
        assert_eq!(entries[1].extra["resource-name"], json!("resource3"));
        assert_eq!(
            entries[0].table.name(),
            dir.path().join("cities.csv").display().to_string()
        );
        match entries[1].table.schema() {
            SchemaSource::Path(path) => assert_eq!(path, &dir.path().join("people.json")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_tabular_package_has_no_tables() {
        let dir = TempDir::new().unwrap();
        let source = write_package(
            &dir,
            &json!({"resources": [{"name": "readme", "path": "README.md"}]}),
        );
        assert_eq!(DataPackageProfile.tables(&source, &ProfileOptions::new()).count(), 0);
    }

    #[test]
    fn test_invalid_json_is_one_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("datapackage.json");
        fs::write(&path, "{\"resources\": [").unwrap();

        let items: Vec<_> = DataPackageProfile
            .tables(&path.to_string_lossy(), &ProfileOptions::new())
            .collect();
        assert_eq!(items.len(), 1);
        let err = items.into_iter().next().unwrap().unwrap_err();
        assert!(err.to_string().contains("Unable to parse JSON"));
    }

    #[test]
    fn test_inline_data_and_remote_paths() {
        let dir = TempDir::new().unwrap();
        let source = write_package(
            &dir,
            &json!({
                "name": "pkg",
                "resources": [
                    {"name": "inline", "data": [["id"], [1]], "schema": {"fields": [{"name": "id", "type": "integer"}]}},
                    {"name": "remote", "path": "https://example.com/data.csv", "schema": {"fields": []}}
                ]
            }),
        );
        let items: Vec<_> = DataPackageProfile
            .tables(&source, &ProfileOptions::new())
            .collect();
        assert_eq!(items[0].as_ref().unwrap().table.name(), "pkg/inline");
        assert!(items[1].is_err());
    }

    #[test]
    fn test_dialect() {
        let options = dialect(&json!({"dialect": {"delimiter": ";", "header": false}}));
        assert_eq!(options.delimiter, b';');
        assert!(!options.has_header);
        assert_eq!(dialect(&json!({})).delimiter, b',');
    }
}
