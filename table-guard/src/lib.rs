//! # table-guard - Tabular Data Inspection for Rust
//!
//! table-guard inspects tabular data sources (one table or many) and produces
//! a structured validity report: which rows and columns break structural or
//! schema rules, with bounded memory and time per table, and without one bad
//! table aborting the rest.
//!
//! ## Overview
//!
//! An inspection takes a source locator, a profile that expands it into
//! tables, and a selection of checks. Each table is streamed once: head
//! checks look at the headers and a sample, body checks look at every row,
//! and table checks turn read failures into report entries. Row, error and
//! table limits cap the work done.
//!
//! ## Quick Start
//!
//! ```rust
//! use table_guard::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let inspector = Inspector::builder()
//!     .checks(CheckSelection::Category(CheckCategory::Structure))
//!     .row_limit(10_000)
//!     .build()?;
//!
//! let report = inspector
//!     .inspect("data/cities.csv", "table", &ProfileOptions::new())
//!     .await?;
//!
//! for table in &report.tables {
//!     for issue in &table.errors {
//!         println!(
//!             "{}: {} (row {:?}, column {:?})",
//!             issue.code, issue.message, issue.row_number, issue.column_number
//!         );
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Features
//!
//! ### Built-in checks
//!
//! - **Structure**: blank and duplicate headers, blank and duplicate rows,
//!   extra and missing values, read failures
//! - **Schema**: header/field mismatches, values that cannot be cast to the
//!   field type, and field constraints (required, unique, pattern, enum,
//!   length and range)
//!
//! Custom checks are plain closures registered on the builder:
//!
//! ```rust
//! use table_guard::prelude::*;
//!
//! let inspector = Inspector::builder()
//!     .check(Check::body("negative-id", CheckCategory::Structure, |cells, _state| {
//!         cells
//!             .iter()
//!             .filter(|cell| cell.header() == Some("id"))
//!             .filter(|cell| cell.value().and_then(|v| v.as_str()).map_or(false, |v| v.starts_with('-')))
//!             .map(|cell| Finding::new("Negative id").at_row(cell.row_number).at_column(cell.column_number))
//!             .collect()
//!     }))
//!     .build()
//!     .unwrap();
//! assert_eq!(inspector.checks().codes().last(), Some(&"negative-id"));
//! ```
//!
//! ### Profiles
//!
//! - `table`: one CSV file
//! - `datapackage`: the tabular resources of a Data Package
//! - `glob`: every CSV file matching a pattern
//!
//! ### Observability
//!
//! Every phase emits structured `tracing` events; see [`logging`] for a
//! ready-made subscriber setup.
//!
//! ## Architecture
//!
//! - **`core`**: registry, alignment, the table state machine, the
//!   orchestrator and reports
//! - **`checks`**: the built-in check catalog
//! - **`schema`**: fields, casting and type inference
//! - **`sources`**: table readers (CSV, inline rows)
//! - **`profiles`**: source expansion into tables
//! - **`logging`**: logging configuration

pub mod checks;
pub mod core;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod profiles;
pub mod schema;
pub mod sources;
