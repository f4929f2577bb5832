//! Inspector configuration.

use super::registry::CheckSelection;
use super::table::Limits;
use crate::error::{ErrorContext, InspectorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an [`Inspector`](super::Inspector).
///
/// Every key is optional when deserializing; missing keys take the defaults
/// below. Keys are kebab-case:
///
/// ```json
/// {
///     "checks": {"blank-row": false},
///     "table-limit": 10,
///     "row-limit": 1000,
///     "error-limit": 1000,
///     "sample-size": 100
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct InspectorConfig {
    /// Which checks run (default: all)
    pub checks: CheckSelection,
    /// Maximum tables taken from a profile (default: 10)
    pub table_limit: usize,
    /// Row position at which streaming stops (default: 1000)
    pub row_limit: usize,
    /// Maximum issues reported per table (default: 1000)
    pub error_limit: usize,
    /// Rows buffered for head checks and schema inference (default: 100)
    pub sample_size: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            checks: CheckSelection::All,
            table_limit: 10,
            row_limit: 1000,
            error_limit: 1000,
            sample_size: 100,
        }
    }
}

impl InspectorConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| InspectorError::Configuration(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Loading config {}", path.display()))
    }

    /// Checks that every limit is positive.
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("table-limit", self.table_limit),
            ("row-limit", self.row_limit),
            ("error-limit", self.error_limit),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(InspectorError::Configuration(format!(
                    "{name} must be positive"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn limits(&self) -> Limits {
        Limits {
            row_limit: self.row_limit,
            error_limit: self.error_limit,
            sample_size: self.sample_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CheckCategory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = InspectorConfig::default();
        assert_eq!(config.checks, CheckSelection::All);
        assert_eq!(config.table_limit, 10);
        assert_eq!(config.row_limit, 1000);
        assert_eq!(config.error_limit, 1000);
        assert_eq!(config.sample_size, 100);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = InspectorConfig::from_json(r#"{"row-limit": 50, "checks": "schema"}"#).unwrap();
        assert_eq!(config.row_limit, 50);
        assert_eq!(config.error_limit, 1000);
        assert_eq!(config.checks, CheckSelection::Category(CheckCategory::Schema));
    }

    #[test]
    fn test_invalid_config() {
        assert!(InspectorConfig::from_json(r#"{"row-limit": 0}"#)
            .unwrap_err()
            .is_configuration());
        assert!(InspectorConfig::from_json(r#"{"checks": 3}"#).is_err());
        assert!(InspectorConfig::from_json(r#"{"row_limit": 3}"#).is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"checks": {{"blank-row": false}}, "table-limit": 2}}"#).unwrap();
        file.flush().unwrap();

        let config = InspectorConfig::from_path(file.path()).unwrap();
        assert_eq!(config.table_limit, 2);
        assert_eq!(config.checks, CheckSelection::explicit([("blank-row", false)]));
    }

    #[test]
    fn test_from_missing_path() {
        let err = InspectorConfig::from_path("/nonexistent/config.json").unwrap_err();
        assert!(err.to_string().contains("Reading config"));
    }
}
