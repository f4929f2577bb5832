//! Check catalog and selection resolution.

use super::check::{
    BodyCheckFn, Check, CheckCategory, CheckContext, Executable, HeadCheckFn, TableCheckFn,
};
use crate::error::{InspectorError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

static BUILTIN: Lazy<CheckRegistry> = Lazy::new(|| CheckRegistry {
    checks: crate::checks::catalog().into_iter().map(Arc::new).collect(),
});

/// Which checks an inspection runs.
///
/// Parses from `"all"`, `"structure"`, `"schema"` or a JSON object mapping
/// check codes to booleans.
///
/// # Explicit selections
///
/// When any listed code is `true`, only the `true` codes run. When every
/// listed code is `false`, everything else runs. An empty map runs every
/// check.
///
/// ```rust
/// use table_guard::core::CheckSelection;
///
/// let only = CheckSelection::explicit([("blank-row", true)]);
/// let except: CheckSelection = serde_json::from_str(r#"{"blank-row": false}"#).unwrap();
/// assert_ne!(only, except);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckSelection {
    /// Every registered check
    #[default]
    All,
    /// Checks of one category
    Category(CheckCategory),
    /// Per-code inclusion flags
    Explicit(BTreeMap<String, bool>),
}

impl CheckSelection {
    /// Creates an explicit selection.
    pub fn explicit<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Self::Explicit(flags.into_iter().map(|(c, v)| (c.into(), v)).collect())
    }

    /// Interprets a JSON value as a selection.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => name.parse(),
            Value::Object(map) => map
                .iter()
                .map(|(code, flag)| match flag {
                    Value::Bool(flag) => Ok((code.clone(), *flag)),
                    _ => Err(InspectorError::UnsupportedCheckSelection(value.to_string())),
                })
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Self::Explicit),
            other => Err(InspectorError::UnsupportedCheckSelection(other.to_string())),
        }
    }

    fn includes(&self, check: &Check) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => check.category() == *category,
            Self::Explicit(flags) => {
                let default = !flags.values().any(|v| *v);
                flags.get(check.code()).copied().unwrap_or(default)
            }
        }
    }
}

impl FromStr for CheckSelection {
    type Err = InspectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            other => other.parse().map(Self::Category),
        }
    }
}

impl Serialize for CheckSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Category(category) => serializer.serialize_str(category.as_str()),
            Self::Explicit(flags) => flags.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CheckSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// The catalog of available checks, in registration order.
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    checks: Vec<Arc<Check>>,
}

impl CheckRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the standard catalog.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Appends a check. Codes must be unique.
    pub fn register(&mut self, check: Check) -> Result<()> {
        if self.get(check.code()).is_some() {
            return Err(InspectorError::DuplicateCheck(check.code().to_string()));
        }
        debug!(
            check.code = %check.code(),
            check.category = %check.category(),
            check.context = %check.context(),
            "Registered check"
        );
        self.checks.push(Arc::new(check));
        Ok(())
    }

    /// Returns the check registered under `code`.
    pub fn get(&self, code: &str) -> Option<&Arc<Check>> {
        self.checks.iter().find(|c| c.code() == code)
    }

    /// Returns every registered check.
    pub fn checks(&self) -> &[Arc<Check>] {
        &self.checks
    }

    /// Resolves a selection into an ordered, dependency-valid list.
    ///
    /// # Errors
    ///
    /// - [`InspectorError::UnknownCheck`] if an explicit selection names an
    ///   unregistered code
    /// - [`InspectorError::UnsatisfiedDependency`] if a selected check
    ///   requires a check that does not precede it
    pub fn resolve(&self, selection: &CheckSelection) -> Result<ResolvedChecks> {
        if let CheckSelection::Explicit(flags) = selection {
            if let Some(code) = flags.keys().find(|code| self.get(code).is_none()) {
                return Err(InspectorError::UnknownCheck(code.clone()));
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut checks = Vec::new();
        for check in self.checks.iter().filter(|c| selection.includes(c)) {
            if !check.required_codes().iter().all(|r| seen.contains(r.as_str())) {
                return Err(InspectorError::unsatisfied_dependency(
                    check.code(),
                    check.required_codes(),
                ));
            }
            seen.insert(check.code());
            checks.push(Arc::clone(check));
        }

        debug!(
            selection = ?selection,
            checks.selected = checks.len(),
            checks.registered = self.checks.len(),
            "Resolved check selection"
        );
        Ok(ResolvedChecks { checks })
    }
}

/// An ordered check list produced by [`CheckRegistry::resolve`].
///
/// Immutable once resolved; workers share it through an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ResolvedChecks {
    checks: Vec<Arc<Check>>,
}

impl ResolvedChecks {
    /// Returns the checks in order.
    pub fn checks(&self) -> &[Arc<Check>] {
        &self.checks
    }

    /// Returns the codes in order.
    pub fn codes(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.code()).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Returns true if any check of `category` was selected.
    pub fn has_category(&self, category: CheckCategory) -> bool {
        self.checks.iter().any(|c| c.category() == category)
    }

    /// Returns the checks of one context, in order.
    pub fn in_context(&self, context: CheckContext) -> impl Iterator<Item = &Arc<Check>> {
        self.checks.iter().filter(move |c| c.context() == context)
    }

    pub(crate) fn table_checks(&self) -> impl Iterator<Item = (&str, &TableCheckFn)> {
        self.checks.iter().filter_map(|c| match c.executable() {
            Executable::Table(f) => Some((c.code(), f.as_ref())),
            _ => None,
        })
    }

    pub(crate) fn head_checks(&self) -> impl Iterator<Item = (&str, &HeadCheckFn)> {
        self.checks.iter().filter_map(|c| match c.executable() {
            Executable::Head(f) => Some((c.code(), f.as_ref())),
            _ => None,
        })
    }

    pub(crate) fn body_checks(&self) -> impl Iterator<Item = (&str, &BodyCheckFn)> {
        self.checks.iter().filter_map(|c| match c.executable() {
            Executable::Body(f) => Some((c.code(), f.as_ref())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop_body(code: &str, category: CheckCategory) -> Check {
        Check::body(code, category, |_, _| Vec::new())
    }

    fn registry() -> CheckRegistry {
        let mut registry = CheckRegistry::new();
        registry
            .register(noop_body("a", CheckCategory::Structure))
            .unwrap();
        registry
            .register(noop_body("b", CheckCategory::Schema).requires(["a"]))
            .unwrap();
        registry
            .register(noop_body("c", CheckCategory::Structure))
            .unwrap();
        registry
    }

    #[test]
    fn test_resolve_all_keeps_catalog_order() {
        let resolved = registry().resolve(&CheckSelection::All).unwrap();
        assert_eq!(resolved.codes(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_resolve_category() {
        let resolved = registry()
            .resolve(&CheckSelection::Category(CheckCategory::Structure))
            .unwrap();
        assert_eq!(resolved.codes(), vec!["a", "c"]);
    }

    #[test]
    fn test_resolve_category_with_missing_dependency() {
        let err = registry()
            .resolve(&CheckSelection::Category(CheckCategory::Schema))
            .unwrap_err();
        assert!(matches!(err, InspectorError::UnsatisfiedDependency { ref code, .. } if code == "b"));
    }

    #[test]
    fn test_explicit_default_rule() {
        let registry = registry();
        let only = registry
            .resolve(&CheckSelection::explicit([("c", true)]))
            .unwrap();
        assert_eq!(only.codes(), vec!["c"]);

        let except = registry
            .resolve(&CheckSelection::explicit([("c", false)]))
            .unwrap();
        assert_eq!(except.codes(), vec!["a", "b"]);

        let everything = registry
            .resolve(&CheckSelection::Explicit(BTreeMap::new()))
            .unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn test_explicit_unknown_code() {
        let err = registry()
            .resolve(&CheckSelection::explicit([("zzz", true)]))
            .unwrap_err();
        assert!(matches!(err, InspectorError::UnknownCheck(ref code) if code == "zzz"));
    }

    #[test]
    fn test_explicit_dependency_dropped() {
        let err = registry()
            .resolve(&CheckSelection::explicit([("a", false)]))
            .unwrap_err();
        assert!(matches!(err, InspectorError::UnsatisfiedDependency { .. }));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = registry();
        let err = registry
            .register(noop_body("a", CheckCategory::Structure))
            .unwrap_err();
        assert!(matches!(err, InspectorError::DuplicateCheck(_)));
    }

    #[test]
    fn test_selection_parsing() {
        assert_eq!(
            "structure".parse::<CheckSelection>().unwrap(),
            CheckSelection::Category(CheckCategory::Structure)
        );
        assert_eq!(
            CheckSelection::from_value(&json!("all")).unwrap(),
            CheckSelection::All
        );
        assert!(matches!(
            CheckSelection::from_value(&json!(["blank-row"])),
            Err(InspectorError::UnsupportedCheckSelection(_))
        ));
        assert!(matches!(
            CheckSelection::from_value(&json!({"blank-row": "yes"})),
            Err(InspectorError::UnsupportedCheckSelection(_))
        ));
        assert!(serde_json::from_str::<CheckSelection>("\"everything\"").is_err());
    }

    #[test]
    fn test_selection_serde_round_trip() {
        let selection = CheckSelection::explicit([("blank-row", false)]);
        let text = serde_json::to_string(&selection).unwrap();
        assert_eq!(text, r#"{"blank-row":false}"#);
        assert_eq!(serde_json::from_str::<CheckSelection>(&text).unwrap(), selection);
    }

    #[test]
    fn test_builtin_resolves_for_every_selection() {
        let registry = CheckRegistry::builtin();
        for selection in [
            CheckSelection::All,
            CheckSelection::Category(CheckCategory::Structure),
            CheckSelection::Category(CheckCategory::Schema),
        ] {
            assert!(registry.resolve(&selection).is_ok(), "{selection:?}");
        }
    }

    #[test]
    fn test_builtin_codes_are_unique() {
        let registry = CheckRegistry::builtin();
        let codes: HashSet<_> = registry.checks().iter().map(|c| c.code()).collect();
        assert_eq!(codes.len(), registry.checks().len());
    }
}
