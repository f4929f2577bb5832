//! The inspection engine.
//!
//! ## Overview
//!
//! - **[`CheckRegistry`]**: the catalog of checks, resolved against a
//!   [`CheckSelection`] into an ordered, dependency-valid [`ResolvedChecks`]
//! - **[`align_columns`] / [`align_cells`]**: the positional column and cell
//!   models checks operate on
//! - **[`TableInspector`]**: runs one table through the checks under
//!   [`Limits`], producing a [`TableReport`]
//! - **[`Inspector`]**: expands a source through a profile and inspects its
//!   tables concurrently, producing an [`InspectionReport`]
//!
//! ## Architecture
//!
//! ```text
//! source ──► Profile ──► TableEntry* ──► (table-limit) ──► worker per table
//!                                                            │
//!     ┌──────────────────────────────────────────────────────┘
//!     ▼
//! Opening ──► HeadChecking ──► BodyChecking ──► Closed ──► TableReport
//!    │                              │
//!    └──► FatalError (table checks) ◄┘ read error
//! ```
//!
//! ## Example
//!
//! ```rust
//! use table_guard::core::{CheckCategory, CheckRegistry, CheckSelection};
//!
//! let registry = CheckRegistry::builtin();
//! let structure = registry
//!     .resolve(&CheckSelection::Category(CheckCategory::Structure))
//!     .unwrap();
//! assert!(structure.codes().contains(&"blank-row"));
//! assert!(!structure.codes().contains(&"non-castable-value"));
//! ```

mod alignment;
mod check;
mod config;
mod inspector;
mod registry;
mod report;
mod table;

pub use alignment::{align_cells, align_columns, Cell, Column};
pub use check::{
    BodyCheckFn, Check, CheckCategory, CheckContext, CheckState, Executable, Finding,
    HeadCheckFn, TableCheckFn,
};
pub use config::InspectorConfig;
pub use inspector::{Inspector, InspectorBuilder};
pub use registry::{CheckRegistry, CheckSelection, ResolvedChecks};
pub use report::{InspectionReport, Issue, TableReport};
pub use table::{Limits, TableInspector};
