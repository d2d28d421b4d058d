//! Workbook export pipeline.
//!
//! [`run`] processes one workbook top to bottom:
//!
//! 1. open the workbook and print its sheet names
//! 2. for each sheet, in workbook order: load, normalize the header, print diagnostics, export
//! 3. return a [`RunSummary`] with one [`SheetOutcome`] per sheet
//!
//! Opening the workbook or reading a sheet is fatal and returned as `Err`. Header promotion and
//! export failures only fail their sheet: they are reported, recorded in the summary, and the run
//! moves on to the next sheet.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ExportError, ExportResult};
use crate::export::export_table;
use crate::normalize::{normalize, HeaderPolicy};
use crate::observability::{ExportContext, ExportObserver, ExportSeverity, ExportStats};
use crate::report::{Reporter, DEFAULT_CATEGORY_COLUMNS};
use crate::workbook::Workbook;

/// Workbook read when no input path is given.
pub const DEFAULT_INPUT: &str = "Attachments/Sample Employee Data.xlsx";

/// Number of sample rows printed per sheet by default.
pub const DEFAULT_SAMPLE_ROWS: usize = 5;

/// Options controlling a run.
///
/// Use [`Default`] for the stock employee-workbook behavior and override fields with struct
/// update syntax.
#[derive(Clone)]
pub struct ExportOptions {
    /// Workbook to read.
    pub input: PathBuf,
    /// Directory that receives `<sheet>_data.json` files. Created if missing.
    pub output_dir: PathBuf,
    /// Header promotion policy applied to every sheet.
    pub header_policy: HeaderPolicy,
    /// Columns whose distinct values are listed when all of them are present.
    pub category_columns: Vec<String>,
    /// Number of sample rows printed per sheet.
    pub sample_rows: usize,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ExportObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ExportSeverity,
}

impl fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportOptions")
            .field("input", &self.input)
            .field("output_dir", &self.output_dir)
            .field("header_policy", &self.header_policy)
            .field("category_columns", &self.category_columns)
            .field("sample_rows", &self.sample_rows)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("."),
            header_policy: HeaderPolicy::default(),
            category_columns: DEFAULT_CATEGORY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            sample_rows: DEFAULT_SAMPLE_ROWS,
            observer: None,
            alert_at_or_above: ExportSeverity::Critical,
        }
    }
}

/// Result of processing one sheet.
#[derive(Debug)]
pub enum SheetStatus {
    /// The sheet was written to `path`.
    Exported {
        path: PathBuf,
        rows: usize,
        columns: usize,
        promoted: bool,
    },
    /// The sheet was skipped; no file was written for it.
    Failed { error: ExportError },
}

/// Outcome for a single sheet.
#[derive(Debug)]
pub struct SheetOutcome {
    /// Sheet name.
    pub sheet: String,
    /// What happened to it.
    pub status: SheetStatus,
}

impl SheetOutcome {
    /// Returns `true` if the sheet was exported.
    pub fn is_exported(&self) -> bool {
        matches!(self.status, SheetStatus::Exported { .. })
    }

    /// Path of the exported file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.status {
            SheetStatus::Exported { path, .. } => Some(path),
            SheetStatus::Failed { .. } => None,
        }
    }
}

/// Per-sheet results of a run, in workbook order.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One entry per sheet.
    pub outcomes: Vec<SheetOutcome>,
}

impl RunSummary {
    /// Sheets that were exported.
    pub fn exported(&self) -> impl Iterator<Item = &SheetOutcome> {
        self.outcomes.iter().filter(|o| o.is_exported())
    }

    /// Sheets that failed.
    pub fn failed(&self) -> impl Iterator<Item = &SheetOutcome> {
        self.outcomes.iter().filter(|o| !o.is_exported())
    }

    /// Returns `true` if every sheet was exported.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(SheetOutcome::is_exported)
    }

    /// Look up the outcome for `sheet`.
    pub fn get(&self, sheet: &str) -> Option<&SheetOutcome> {
        self.outcomes.iter().find(|o| o.sheet == sheet)
    }
}

/// Run the pipeline described by `options`, writing diagnostics to `out`.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use workbook_export::normalize::HeaderPolicy;
/// use workbook_export::observability::StdErrObserver;
/// use workbook_export::pipeline::{run, ExportOptions};
///
/// # fn main() -> Result<(), workbook_export::ExportError> {
/// let opts = ExportOptions {
///     input: "staff.xlsx".into(),
///     output_dir: "out".into(),
///     header_policy: HeaderPolicy::Never,
///     observer: Some(Arc::new(StdErrObserver)),
///     ..Default::default()
/// };
///
/// let summary = run(&opts, std::io::stdout().lock())?;
/// println!("failed sheets: {}", summary.failed().count());
/// # Ok(())
/// # }
/// ```
pub fn run<W: Write>(options: &ExportOptions, out: W) -> ExportResult<RunSummary> {
    let workbook_ctx = ExportContext {
        workbook: options.input.clone(),
        sheet: None,
    };
    let mut workbook = Workbook::open(&options.input)
        .and_then(|wb| {
            fs::create_dir_all(&options.output_dir)?;
            Ok(wb)
        })
        .inspect_err(|e| notify_failure(options, &workbook_ctx, e))?;

    let mut reporter = Reporter::new(out, options.sample_rows, options.category_columns.clone());
    let sheet_names = workbook.sheet_names().to_vec();
    reporter.sheet_names(&sheet_names)?;

    let mut summary = RunSummary {
        outcomes: Vec::with_capacity(sheet_names.len()),
    };
    for sheet in sheet_names {
        let ctx = ExportContext {
            workbook: options.input.clone(),
            sheet: Some(sheet.clone()),
        };
        reporter.sheet_banner(&sheet)?;

        let raw = workbook
            .load_sheet(&sheet)
            .inspect_err(|e| notify_failure(options, &ctx, e))?;

        let status = match normalize(&sheet, raw, &options.header_policy) {
            Err(error) => {
                reporter.sheet_skipped(&error)?;
                SheetStatus::Failed { error }
            }
            Ok(normalized) => {
                let table = normalized.table;
                reporter.table(&table)?;
                match export_table(&table, &sheet, &options.output_dir) {
                    Ok(path) => {
                        reporter.export_saved(&path)?;
                        SheetStatus::Exported {
                            path,
                            rows: table.row_count(),
                            columns: table.column_count(),
                            promoted: normalized.promoted,
                        }
                    }
                    Err(error) => {
                        reporter.export_failed(&error)?;
                        SheetStatus::Failed { error }
                    }
                }
            }
        };

        match &status {
            SheetStatus::Exported {
                rows,
                columns,
                promoted,
                ..
            } => {
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_success(
                        &ctx,
                        ExportStats {
                            rows: *rows,
                            columns: *columns,
                            promoted: *promoted,
                        },
                    );
                }
            }
            SheetStatus::Failed { error } => notify_failure(options, &ctx, error),
        }
        summary.outcomes.push(SheetOutcome { sheet, status });
    }

    let exported = summary.exported().count();
    reporter.summary(exported, summary.outcomes.len())?;
    Ok(summary)
}

fn notify_failure(options: &ExportOptions, ctx: &ExportContext, error: &ExportError) {
    if let Some(obs) = options.observer.as_ref() {
        let sev = ExportSeverity::for_error(error);
        obs.on_failure(ctx, sev, error);
        if sev >= options.alert_at_or_above {
            obs.on_alert(ctx, sev, error);
        }
    }
}
