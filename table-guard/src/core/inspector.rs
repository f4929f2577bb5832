//! Multi-table orchestration.

use super::check::Check;
use super::config::InspectorConfig;
use super::registry::{CheckRegistry, CheckSelection, ResolvedChecks};
use super::report::{InspectionReport, TableReport};
use super::table::TableInspector;
use crate::error::{InspectorError, Result};
use crate::logging::LogConfig;
use crate::profiles::{Profile, ProfileOptions, ProfileRegistry, TableEntry};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, instrument, warn};

/// Inspects every table a profile yields and aggregates the reports.
///
/// Configuration errors (unknown checks, unsatisfied dependencies, bad
/// limits) surface when the inspector is built, before any table is read.
///
/// # Examples
///
/// ```rust,no_run
/// use table_guard::prelude::*;
///
/// # async fn example() -> table_guard::error::Result<()> {
/// let inspector = Inspector::builder()
///     .checks(CheckSelection::explicit([("blank-row", false)]))
///     .row_limit(500)
///     .build()?;
///
/// let report = inspector
///     .inspect("data/valid.csv", "table", &ProfileOptions::new())
///     .await?;
/// println!("{}", serde_json::to_string_pretty(&report)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Inspector {
    config: InspectorConfig,
    checks: Arc<ResolvedChecks>,
    profiles: ProfileRegistry,
    log: LogConfig,
}

impl Inspector {
    /// Creates an inspector with the default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Creates an inspector from a configuration.
    pub fn with_config(config: InspectorConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Creates a builder.
    pub fn builder() -> InspectorBuilder {
        InspectorBuilder::default()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Returns the resolved checks, in execution order.
    pub fn checks(&self) -> &ResolvedChecks {
        &self.checks
    }

    /// Inspects `source` through the named profile.
    ///
    /// At most `table-limit` items are taken from the profile; items that
    /// fail count toward the limit and become warnings. Each table is
    /// inspected on its own blocking task; reports keep the profile's order.
    ///
    /// # Errors
    ///
    /// - [`InspectorError::UnsupportedProfile`] if no profile has that name
    /// - [`InspectorError::TableOpen`] if a table could not be read and no
    ///   table check reported it; the first such table in order wins
    /// - [`InspectorError::Internal`] if a worker panicked
    #[instrument(skip(self, options), fields(source = %source, profile = %profile))]
    pub async fn inspect(
        &self,
        source: &str,
        profile: &str,
        options: &ProfileOptions,
    ) -> Result<InspectionReport> {
        let start = Instant::now();
        let expander = self
            .profiles
            .get(profile)
            .ok_or_else(|| InspectorError::UnsupportedProfile(profile.to_string()))?;

        let (entries, warnings) = {
            let source = source.to_string();
            let options = options.clone();
            let limit = self.config.table_limit;
            tokio::task::spawn_blocking(move || {
                collect_tables(expander.as_ref(), &source, &options, limit)
            })
            .await
            .map_err(worker_failure)?
        };
        for warning in &warnings {
            warn!(warning = %warning, "Profile reported a problem");
        }

        let mut extras: Vec<Map<String, Value>> = Vec::with_capacity(entries.len());
        let handles: Vec<JoinHandle<Result<TableReport>>> = entries
            .into_iter()
            .map(|TableEntry { table, extra }| {
                extras.push(extra);
                let checks = Arc::clone(&self.checks);
                let limits = self.config.limits();
                let log = self.log.clone();
                tokio::task::spawn_blocking(move || {
                    TableInspector::new(&checks, limits)
                        .with_log_config(log)
                        .inspect(&table)
                })
            })
            .collect();

        // Every worker finishes before the first failure is returned.
        let results = futures::future::join_all(handles).await;
        let mut tables = Vec::with_capacity(results.len());
        let mut failure = None;
        for (result, extra) in results.into_iter().zip(extras) {
            match result.map_err(worker_failure).and_then(|r| r) {
                Ok(mut report) => {
                    report.merge_metadata(extra);
                    tables.push(report);
                }
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        let report = InspectionReport::new(start.elapsed(), tables, warnings);
        info!(
            report.valid = report.valid,
            report.tables = report.table_count,
            report.errors = report.error_count,
            report.time = report.time,
            "Inspection completed"
        );
        Ok(report)
    }
}

fn collect_tables(
    profile: &dyn Profile,
    source: &str,
    options: &ProfileOptions,
    limit: usize,
) -> (Vec<TableEntry>, Vec<String>) {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();
    // Failed items count toward the limit.
    for item in profile.tables(source, options).take(limit) {
        match item {
            Ok(entry) => entries.push(entry),
            Err(e) => warnings.push(e.to_string()),
        }
    }
    (entries, warnings)
}

fn worker_failure(error: JoinError) -> InspectorError {
    InspectorError::Internal(format!("inspection worker failed: {error}"))
}

/// Builder for [`Inspector`].
#[derive(Debug, Default)]
pub struct InspectorBuilder {
    config: InspectorConfig,
    registry: Option<CheckRegistry>,
    custom_checks: Vec<Check>,
    profiles: Option<ProfileRegistry>,
    log: LogConfig,
}

impl InspectorBuilder {
    /// Replaces the whole configuration.
    pub fn config(mut self, config: InspectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the check selection.
    pub fn checks(mut self, checks: CheckSelection) -> Self {
        self.config.checks = checks;
        self
    }

    pub fn table_limit(mut self, limit: usize) -> Self {
        self.config.table_limit = limit;
        self
    }

    pub fn row_limit(mut self, limit: usize) -> Self {
        self.config.row_limit = limit;
        self
    }

    pub fn error_limit(mut self, limit: usize) -> Self {
        self.config.error_limit = limit;
        self
    }

    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    /// Replaces the built-in check catalog.
    pub fn registry(mut self, registry: CheckRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Appends a custom check after the catalog.
    pub fn check(mut self, check: Check) -> Self {
        self.custom_checks.push(check);
        self
    }

    /// Registers a custom profile alongside the built-in ones.
    pub fn profile(mut self, name: impl Into<String>, profile: impl Profile + 'static) -> Self {
        self.profiles
            .get_or_insert_with(ProfileRegistry::builtin)
            .register(name, profile);
        self
    }

    /// Sets the logging configuration.
    pub fn log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Validates the configuration and resolves the check selection.
    pub fn build(self) -> Result<Inspector> {
        self.config.validate()?;
        let mut registry = self.registry.unwrap_or_else(CheckRegistry::builtin);
        for check in self.custom_checks {
            registry.register(check)?;
        }
        let checks = registry.resolve(&self.config.checks)?;
        info!(
            checks = checks.len(),
            table_limit = self.config.table_limit,
            row_limit = self.config.row_limit,
            error_limit = self.config.error_limit,
            "Inspector ready"
        );
        Ok(Inspector {
            config: self.config,
            checks: Arc::new(checks),
            profiles: self.profiles.unwrap_or_else(ProfileRegistry::builtin),
            log: self.log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CheckCategory;
    use crate::profiles::TableIter;
    use crate::sources::{CsvReader, InlineReader, Table};
    use serde_json::json;

    fn three_tables(_: &str, _: &ProfileOptions) -> TableIter {
        let tables = (1..=3).map(|n| {
            let table = Table::new(InlineReader::from_rows(vec![vec!["id"], vec!["1"]]))
                .with_name(format!("t{n}"));
            Ok(TableEntry::new(table).with_extra("n", n))
        });
        Box::new(tables)
    }

    #[tokio::test]
    async fn test_unknown_profile() {
        let inspector = Inspector::new().unwrap();
        let err = inspector
            .inspect("x", "ckan", &ProfileOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Profile \"ckan\" is not supported");
    }

    #[tokio::test]
    async fn test_table_limit_and_metadata_order() {
        let inspector = Inspector::builder()
            .table_limit(2)
            .profile("three", three_tables)
            .build()
            .unwrap();
        let report = inspector
            .inspect("", "three", &ProfileOptions::new())
            .await
            .unwrap();
        assert_eq!(report.table_count, 2);
        assert_eq!(report.tables[0].metadata["n"], json!(1));
        assert_eq!(report.tables[1].metadata["n"], json!(2));
        assert!(report.valid);
    }

    #[tokio::test]
    async fn test_profile_errors_become_warnings() {
        let inspector = Inspector::builder()
            .profile("mixed", |_: &str, _: &ProfileOptions| -> TableIter {
                let table = Table::new(CsvReader::from_text("id\n1\n"));
                Box::new(
                    vec![
                        Err(crate::error::SourceError::Source("unreadable entry".into())),
                        Ok(TableEntry::new(table)),
                    ]
                    .into_iter(),
                )
            })
            .build()
            .unwrap();
        let report = inspector
            .inspect("", "mixed", &ProfileOptions::new())
            .await
            .unwrap();
        assert_eq!(report.table_count, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("unreadable entry"));
        assert!(report.tables[0].valid);
        assert!(!report.valid);
    }

    #[tokio::test]
    async fn test_failed_items_count_toward_table_limit() {
        let inspector = Inspector::builder()
            .table_limit(3)
            .profile("broken", |_: &str, _: &ProfileOptions| -> TableIter {
                Box::new(std::iter::repeat_with(|| {
                    Err::<TableEntry, _>(crate::error::SourceError::Source(
                        "unreadable entry".into(),
                    ))
                }))
            })
            .build()
            .unwrap();
        let report = inspector
            .inspect("", "broken", &ProfileOptions::new())
            .await
            .unwrap();
        assert_eq!(report.table_count, 0);
        assert_eq!(report.warnings.len(), 3);
        assert!(!report.valid);
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        assert!(Inspector::builder().row_limit(0).build().is_err());
        let err = Inspector::builder()
            .checks(CheckSelection::explicit([("no-such-check", true)]))
            .build()
            .unwrap_err();
        assert!(matches!(err, InspectorError::UnknownCheck(_)));
        let err = Inspector::builder()
            .check(Check::body("blank-row", CheckCategory::Structure, |_, _| Vec::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, InspectorError::DuplicateCheck(_)));
    }

    #[test]
    fn test_custom_check_runs_last() {
        let inspector = Inspector::builder()
            .check(
                Check::body("custom", CheckCategory::Schema, |_, _| Vec::new())
                    .requires(["non-castable-value"]),
            )
            .build()
            .unwrap();
        assert_eq!(inspector.checks().codes().last(), Some(&"custom"));
    }
}
