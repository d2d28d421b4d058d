//! `workbook-export` loads a spreadsheet workbook, prints a short structural report for every
//! sheet, and writes each sheet to `<sheet>_data.json` as a JSON array of row objects.
//!
//! The primary entrypoint is [`pipeline::run`], configured through [`pipeline::ExportOptions`].
//!
//! ## Per-sheet steps
//!
//! 1. **Load** ([`workbook`]): the first row of the sheet supplies column names; cells become
//!    typed [`types::Value`]s (whole numbers as integers, date cells as datetimes).
//! 2. **Normalize** ([`normalize`]): a [`normalize::HeaderPolicy`] decides whether the first data
//!    row replaces the column names. The default promotes it when a column is named after the
//!    workbook's title banner (`Sample Employee Data`).
//! 3. **Report** ([`report`]): shape, columns, the first rows, and the distinct values of the
//!    `Department` / `Job Role` columns when both exist.
//! 4. **Export** ([`export`]): `[{"column": value, ...}, ...]` with dates in ISO-8601.
//!
//! Opening the workbook is fatal on failure. A sheet whose header cannot be promoted, or whose
//! file cannot be written, is recorded as failed in the returned [`pipeline::RunSummary`] and the
//! run continues.
//!
//! ## Example
//!
//! ```no_run
//! use workbook_export::pipeline::{run, ExportOptions};
//!
//! # fn main() -> Result<(), workbook_export::ExportError> {
//! let opts = ExportOptions {
//!     input: "Attachments/Sample Employee Data.xlsx".into(),
//!     ..Default::default()
//! };
//! let summary = run(&opts, std::io::stdout())?;
//! for outcome in summary.exported() {
//!     println!("{} -> {:?}", outcome.sheet, outcome.path());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`workbook`]: opening workbooks and loading sheets
//! - [`normalize`]: header promotion policy
//! - [`report`]: human-readable diagnostics
//! - [`export`]: JSON serialization and file writing
//! - [`pipeline`]: options and the run entrypoint
//! - [`observability`]: observer hooks for logging/alerts
//! - [`types`]: in-memory table types
//! - [`error`]: error type shared by all of the above

pub mod error;
pub mod export;
pub mod normalize;
pub mod observability;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod workbook;

pub use error::{ExportError, ExportResult};
