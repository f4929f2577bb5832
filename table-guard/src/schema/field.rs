//! The field capability and its Table-Schema-style implementation.

use crate::error::{CastError, SourceError};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt::{self, Debug};

const TRUE_VALUES: &[&str] = &["true", "True", "TRUE", "1"];
const FALSE_VALUES: &[&str] = &["false", "False", "FALSE", "0"];
const ISO_DATE: &str = "%Y-%m-%d";

/// A constraint a field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Required,
    Unique,
    MinLength,
    MaxLength,
    Minimum,
    Maximum,
    Pattern,
    Enum,
}

impl ConstraintKind {
    /// Returns the descriptor name of the constraint.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Required => "required",
            ConstraintKind::Unique => "unique",
            ConstraintKind::MinLength => "minLength",
            ConstraintKind::MaxLength => "maxLength",
            ConstraintKind::Minimum => "minimum",
            ConstraintKind::Maximum => "maximum",
            ConstraintKind::Pattern => "pattern",
            ConstraintKind::Enum => "enum",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema field able to cast and test raw cell values.
///
/// The inspection engine never looks inside a field; schema checks only call
/// these methods. Implementations must be shareable across the workers that
/// inspect tables concurrently.
pub trait Field: Debug + Send + Sync {
    /// Returns the field name, compared against the header.
    fn name(&self) -> &str;

    /// Returns the field type name, used in messages.
    fn field_type(&self) -> &str;

    /// Returns the field format name, used in messages.
    fn format(&self) -> &str {
        "default"
    }

    /// Returns true if the field declares the given constraint.
    fn has_constraint(&self, kind: ConstraintKind) -> bool;

    /// Casts a raw value to the field's logical value.
    ///
    /// With `skip_constraints` false the constraints (other than `unique`)
    /// are enforced as part of the cast.
    fn cast_value(&self, value: &Value, skip_constraints: bool) -> Result<Value, CastError>;

    /// Tests a value against one constraint. Undeclared constraints pass.
    fn test_value(&self, value: &Value, kind: ConstraintKind) -> bool;
}

/// The logical type of a [`SchemaField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Date,
    Any,
}

impl FieldType {
    /// Returns the descriptor name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Any => "any",
        }
    }

    /// Guesses the most specific type a raw string can be read as.
    pub(crate) fn guess(raw: &str) -> FieldType {
        let raw = raw.trim();
        if raw.parse::<i64>().is_ok() {
            FieldType::Integer
        } else if raw.parse::<f64>().map_or(false, f64::is_finite) {
            FieldType::Number
        } else if TRUE_VALUES.contains(&raw) || FALSE_VALUES.contains(&raw) {
            FieldType::Boolean
        } else if NaiveDate::parse_from_str(raw, ISO_DATE).is_ok() {
            FieldType::Date
        } else {
            FieldType::String
        }
    }
}

/// Declared constraints of a field descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<Value>>,
}

/// A field descriptor as it appears in a schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub constraints: Constraints,
}

fn default_format() -> String {
    "default".to_string()
}

impl FieldDescriptor {
    /// Creates a descriptor with the default format and no constraints.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            format: default_format(),
            constraints: Constraints::default(),
        }
    }

    /// Sets the format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets the constraints.
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }
}

/// A compiled field backed by a [`FieldDescriptor`].
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use table_guard::schema::{ConstraintKind, Field, FieldDescriptor, FieldType, SchemaField};
///
/// let field = SchemaField::new(FieldDescriptor::new("age", FieldType::Integer)).unwrap();
/// assert_eq!(field.cast_value(&json!("42"), true).unwrap(), json!(42));
/// assert!(field.cast_value(&json!("forty"), true).is_err());
/// assert!(field.test_value(&json!(""), ConstraintKind::Required));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaField {
    descriptor: FieldDescriptor,
    pattern: Option<Regex>,
}

impl SchemaField {
    /// Compiles a descriptor into a field.
    pub fn new(descriptor: FieldDescriptor) -> Result<Self, SourceError> {
        let pattern = match &descriptor.constraints.pattern {
            Some(pattern) => Some(Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                SourceError::Schema(format!(
                    "invalid pattern for field \"{}\": {e}",
                    descriptor.name
                ))
            })?),
            None => None,
        };
        Ok(Self {
            descriptor,
            pattern,
        })
    }

    /// Creates an unconstrained field of the given type.
    pub fn typed(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            descriptor: FieldDescriptor::new(name, field_type),
            pattern: None,
        }
    }

    /// Returns the underlying descriptor.
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn constraints(&self) -> &Constraints {
        &self.descriptor.constraints
    }

    fn cast_error(&self, value: &Value) -> CastError {
        CastError {
            value: value.to_string(),
            field_type: self.descriptor.field_type.as_str().to_string(),
            format: self.descriptor.format.clone(),
        }
    }

    fn cast_present(&self, value: &Value) -> Option<Value> {
        match self.descriptor.field_type {
            FieldType::Any => Some(value.clone()),
            FieldType::String => match value {
                Value::String(_) => Some(value.clone()),
                other => Some(Value::String(other.to_string())),
            },
            FieldType::Integer => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
                Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
                _ => None,
            },
            FieldType::Number => match value {
                Value::Number(_) => Some(value.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number),
                _ => None,
            },
            FieldType::Boolean => match value {
                Value::Bool(_) => Some(value.clone()),
                Value::String(s) if TRUE_VALUES.contains(&s.trim()) => Some(Value::Bool(true)),
                Value::String(s) if FALSE_VALUES.contains(&s.trim()) => Some(Value::Bool(false)),
                _ => None,
            },
            FieldType::Date => match value {
                Value::String(s) => self
                    .parse_date(s.trim())
                    .map(|date| Value::String(date.format(ISO_DATE).to_string())),
                _ => None,
            },
        }
    }

    // Cast dates are rendered as ISO, so ISO is always accepted as well.
    fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        let format = self.descriptor.format.as_str();
        let declared = match format {
            "default" | "any" => None,
            custom => Some(custom.strip_prefix("fmt:").unwrap_or(custom)),
        };
        declared
            .and_then(|f| NaiveDate::parse_from_str(raw, f).ok())
            .or_else(|| NaiveDate::parse_from_str(raw, ISO_DATE).ok())
    }

    fn bound(&self, bound: &Option<Value>) -> Option<Value> {
        bound
            .as_ref()
            .and_then(|b| self.cast_present(b).or_else(|| Some(b.clone())))
    }
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Field for SchemaField {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn field_type(&self) -> &str {
        self.descriptor.field_type.as_str()
    }

    fn format(&self) -> &str {
        &self.descriptor.format
    }

    fn has_constraint(&self, kind: ConstraintKind) -> bool {
        let c = self.constraints();
        match kind {
            ConstraintKind::Required => c.required,
            ConstraintKind::Unique => c.unique,
            ConstraintKind::MinLength => c.min_length.is_some(),
            ConstraintKind::MaxLength => c.max_length.is_some(),
            ConstraintKind::Minimum => c.minimum.is_some(),
            ConstraintKind::Maximum => c.maximum.is_some(),
            ConstraintKind::Pattern => c.pattern.is_some(),
            ConstraintKind::Enum => c.enumeration.is_some(),
        }
    }

    fn cast_value(&self, value: &Value, skip_constraints: bool) -> Result<Value, CastError> {
        let cast = if is_missing(value) {
            Value::Null
        } else {
            self.cast_present(value)
                .ok_or_else(|| self.cast_error(value))?
        };
        if !skip_constraints {
            let kinds = [
                ConstraintKind::Required,
                ConstraintKind::MinLength,
                ConstraintKind::MaxLength,
                ConstraintKind::Minimum,
                ConstraintKind::Maximum,
                ConstraintKind::Pattern,
                ConstraintKind::Enum,
            ];
            if kinds.iter().any(|kind| !self.test_value(&cast, *kind)) {
                return Err(self.cast_error(value));
            }
        }
        Ok(cast)
    }

    fn test_value(&self, value: &Value, kind: ConstraintKind) -> bool {
        if !self.has_constraint(kind) {
            return true;
        }
        let Ok(cast) = self.cast_value(value, true) else {
            return false;
        };
        if cast.is_null() {
            return kind != ConstraintKind::Required;
        }
        let c = self.constraints();
        match kind {
            ConstraintKind::Required | ConstraintKind::Unique => true,
            ConstraintKind::MinLength => c
                .min_length
                .map_or(true, |min| text_of(&cast).chars().count() >= min),
            ConstraintKind::MaxLength => c
                .max_length
                .map_or(true, |max| text_of(&cast).chars().count() <= max),
            ConstraintKind::Minimum => self.bound(&c.minimum).map_or(true, |min| {
                compare(&cast, &min).map_or(true, |o| o != Ordering::Less)
            }),
            ConstraintKind::Maximum => self.bound(&c.maximum).map_or(true, |max| {
                compare(&cast, &max).map_or(true, |o| o != Ordering::Greater)
            }),
            ConstraintKind::Pattern => self
                .pattern
                .as_ref()
                .map_or(true, |re| re.is_match(&text_of(&cast))),
            ConstraintKind::Enum => c.enumeration.as_ref().map_or(true, |allowed| {
                allowed
                    .iter()
                    .filter_map(|v| self.cast_present(v))
                    .any(|v| v == cast)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(field_type: FieldType, constraints: Constraints) -> SchemaField {
        SchemaField::new(FieldDescriptor::new("f", field_type).with_constraints(constraints))
            .unwrap()
    }

    #[test]
    fn test_cast_integer() {
        let f = field(FieldType::Integer, Constraints::default());
        assert_eq!(f.cast_value(&json!(" 7 "), true).unwrap(), json!(7));
        assert_eq!(f.cast_value(&json!(7), true).unwrap(), json!(7));
        assert_eq!(f.cast_value(&json!(""), true).unwrap(), Value::Null);
        let err = f.cast_value(&json!("7.5"), true).unwrap_err();
        assert_eq!(err.field_type, "integer");
    }

    #[test]
    fn test_cast_boolean_and_date() {
        let b = field(FieldType::Boolean, Constraints::default());
        assert_eq!(b.cast_value(&json!("TRUE"), true).unwrap(), json!(true));
        assert!(b.cast_value(&json!("yes"), true).is_err());

        let d = SchemaField::new(
            FieldDescriptor::new("when", FieldType::Date).with_format("%d/%m/%Y"),
        )
        .unwrap();
        let cast = d.cast_value(&json!("02/01/2020"), true).unwrap();
        assert_eq!(cast, json!("2020-01-02"));
        // re-casting an already cast value is stable
        assert_eq!(d.cast_value(&cast, true).unwrap(), cast);
    }

    #[test]
    fn test_required_constraint() {
        let f = field(
            FieldType::String,
            Constraints {
                required: true,
                ..Default::default()
            },
        );
        assert!(!f.test_value(&json!(""), ConstraintKind::Required));
        assert!(f.test_value(&json!("x"), ConstraintKind::Required));
        assert!(f.cast_value(&json!(""), false).is_err());
        assert!(f.cast_value(&json!(""), true).is_ok());
    }

    #[test]
    fn test_range_constraints() {
        let f = field(
            FieldType::Integer,
            Constraints {
                minimum: Some(json!(1)),
                maximum: Some(json!("10")),
                ..Default::default()
            },
        );
        assert!(f.test_value(&json!("1"), ConstraintKind::Minimum));
        assert!(!f.test_value(&json!(0), ConstraintKind::Minimum));
        assert!(f.test_value(&json!(10), ConstraintKind::Maximum));
        assert!(!f.test_value(&json!("11"), ConstraintKind::Maximum));
        // missing values only fail `required`
        assert!(f.test_value(&json!(""), ConstraintKind::Minimum));
    }

    #[test]
    fn test_pattern_enum_and_length() {
        let f = field(
            FieldType::String,
            Constraints {
                pattern: Some("[A-Z]{2}".to_string()),
                enumeration: Some(vec![json!("AB"), json!("CD")]),
                min_length: Some(2),
                max_length: Some(2),
                ..Default::default()
            },
        );
        assert!(f.test_value(&json!("AB"), ConstraintKind::Pattern));
        assert!(!f.test_value(&json!("ABC"), ConstraintKind::Pattern));
        assert!(!f.test_value(&json!("EF"), ConstraintKind::Enum));
        assert!(!f.test_value(&json!("A"), ConstraintKind::MinLength));
        assert!(!f.test_value(&json!("ABC"), ConstraintKind::MaxLength));
    }

    #[test]
    fn test_invalid_pattern_is_schema_error() {
        let descriptor = FieldDescriptor::new("f", FieldType::String).with_constraints(
            Constraints {
                pattern: Some("(".to_string()),
                ..Default::default()
            },
        );
        let err = SchemaField::new(descriptor).unwrap_err();
        assert_eq!(err.kind(), "schema");
    }

    #[test]
    fn test_guess() {
        assert_eq!(FieldType::guess("12"), FieldType::Integer);
        assert_eq!(FieldType::guess("1.5"), FieldType::Number);
        assert_eq!(FieldType::guess("false"), FieldType::Boolean);
        assert_eq!(FieldType::guess("2020-02-29"), FieldType::Date);
        assert_eq!(FieldType::guess("english"), FieldType::String);
    }

    #[test]
    fn test_descriptor_deserialize() {
        let descriptor: FieldDescriptor = serde_json::from_value(json!({
            "name": "id",
            "type": "integer",
            "constraints": {"required": true, "unique": true, "enum": [1, 2]}
        }))
        .unwrap();
        assert_eq!(descriptor.field_type, FieldType::Integer);
        assert_eq!(descriptor.format, "default");
        assert!(descriptor.constraints.unique);
        assert_eq!(descriptor.constraints.enumeration, Some(vec![json!(1), json!(2)]));
    }
}
