//! Schemas: ordered field capabilities a table's columns are checked against.
//!
//! The engine only needs [`Schema::fields`] and the [`Field`] trait. The rest of
//! this module is a small Table-Schema-style implementation: descriptors loaded
//! from JSON, and majority-vote type inference over a table sample.

mod field;

pub use field::{ConstraintKind, Constraints, Field, FieldDescriptor, FieldType, SchemaField};

use crate::error::SourceError;
use crate::sources::Row;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An ordered list of fields.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Arc<dyn Field>>,
}

#[derive(Deserialize)]
struct SchemaDescriptor {
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Creates a schema from field capabilities.
    pub fn new(fields: Vec<Arc<dyn Field>>) -> Self {
        Self { fields }
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[Arc<dyn Field>] {
        &self.fields
    }

    /// Builds a schema from a JSON descriptor (`{"fields": [...]}`).
    pub fn from_descriptor(descriptor: &Value) -> Result<Self, SourceError> {
        let parsed: SchemaDescriptor = serde_json::from_value(descriptor.clone())
            .map_err(|e| SourceError::Schema(format!("invalid schema descriptor: {e}")))?;
        let fields = parsed
            .fields
            .into_iter()
            .map(|d| SchemaField::new(d).map(|f| Arc::new(f) as Arc<dyn Field>))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    /// Loads a schema descriptor from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SourceError::Schema(format!("unable to read schema {}: {e}", path.display()))
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| {
            SourceError::Schema(format!("unable to parse schema {}: {e}", path.display()))
        })?;
        Self::from_descriptor(&value)
    }

    /// Infers a schema from headers and sample rows.
    ///
    /// Each column gets the type most of its non-empty sample values look
    /// like; ties go to the more specific type. Columns without samples are
    /// strings. Unnamed columns are called `field{n}`.
    pub fn infer(headers: &[Option<String>], sample: &[Row]) -> Self {
        const PREFERENCE: [FieldType; 6] = [
            FieldType::Integer,
            FieldType::Number,
            FieldType::Boolean,
            FieldType::Date,
            FieldType::String,
            FieldType::Any,
        ];

        let fields = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let mut votes: HashMap<FieldType, usize> = HashMap::new();
                for row in sample {
                    let guess = match row.values.get(index) {
                        Some(Value::String(s)) if s.is_empty() => continue,
                        Some(Value::String(s)) => FieldType::guess(s),
                        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => FieldType::Integer,
                        Some(Value::Number(_)) => FieldType::Number,
                        Some(Value::Bool(_)) => FieldType::Boolean,
                        Some(Value::Null) | None => continue,
                        Some(_) => FieldType::Any,
                    };
                    *votes.entry(guess).or_default() += 1;
                }
                let best = votes.values().copied().max().unwrap_or(0);
                let field_type = PREFERENCE
                    .iter()
                    .copied()
                    .find(|t| best > 0 && votes.get(t) == Some(&best))
                    .unwrap_or(FieldType::String);
                let name = header
                    .clone()
                    .unwrap_or_else(|| format!("field{}", index + 1));
                Arc::new(SchemaField::typed(name, field_type)) as Arc<dyn Field>
            })
            .collect();
        Self { fields }
    }
}

/// Where a table's schema comes from.
#[derive(Debug, Clone, Default)]
pub enum SchemaSource {
    /// A schema supplied by the caller or the profile.
    Declared(Schema),
    /// A JSON descriptor parsed when the table is opened.
    Descriptor(Value),
    /// A descriptor file loaded when the table is opened.
    Path(PathBuf),
    /// Inferred from the table's headers and sample.
    #[default]
    Infer,
}

impl SchemaSource {
    /// Acquires the schema for an opened table.
    pub fn resolve(
        &self,
        headers: &[Option<String>],
        sample: &[Row],
    ) -> Result<Schema, SourceError> {
        match self {
            SchemaSource::Declared(schema) => Ok(schema.clone()),
            SchemaSource::Descriptor(descriptor) => Schema::from_descriptor(descriptor),
            SchemaSource::Path(path) => Schema::from_path(path),
            SchemaSource::Infer => Ok(Schema::infer(headers, sample)),
        }
    }
}

impl From<Schema> for SchemaSource {
    fn from(schema: Schema) -> Self {
        SchemaSource::Declared(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(number: usize, values: &[&str]) -> Row {
        Row::new(number, values.iter().map(|v| json!(v)).collect())
    }

    #[test]
    fn test_from_descriptor() {
        let schema = Schema::from_descriptor(&json!({
            "fields": [
                {"name": "id", "type": "integer"},
                {"name": "name"}
            ]
        }))
        .unwrap();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.fields()[0].field_type(), "integer");
        assert_eq!(schema.fields()[1].field_type(), "string");
    }

    #[test]
    fn test_from_descriptor_rejects_unknown_type() {
        let err = Schema::from_descriptor(&json!({
            "fields": [{"name": "id", "type": "geopoint"}]
        }))
        .unwrap_err();
        assert_eq!(err.kind(), "schema");
    }

    #[test]
    fn test_infer_majority_vote() {
        let headers = vec![Some("id".to_string()), Some("name".to_string()), None];
        let sample = vec![
            row(2, &["1", "english", ""]),
            row(3, &["2", "中国人", ""]),
            row(4, &["x", "3", ""]),
        ];
        let schema = Schema::infer(&headers, &sample);
        let types: Vec<_> = schema.fields().iter().map(|f| f.field_type()).collect();
        assert_eq!(types, vec!["integer", "string", "string"]);
        assert_eq!(schema.fields()[2].name(), "field3");
    }

    #[test]
    fn test_schema_source_path_failure() {
        let source = SchemaSource::Path(PathBuf::from("/nonexistent/schema.json"));
        let err = source.resolve(&[], &[]).unwrap_err();
        assert_eq!(err.kind(), "schema");
    }
}
