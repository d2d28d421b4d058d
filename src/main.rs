//! workbook-export CLI
//!
//! Prints a per-sheet report for a workbook and writes every sheet to `<sheet>_data.json`.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use workbook_export::normalize::{HeaderPolicy, DEFAULT_PLACEHOLDER_TITLE};
use workbook_export::observability::{CompositeObserver, ExportObserver, FileObserver, StdErrObserver};
use workbook_export::pipeline::{run, ExportOptions, DEFAULT_INPUT, DEFAULT_SAMPLE_ROWS};
use workbook_export::report::DEFAULT_CATEGORY_COLUMNS;

/// Inspect a spreadsheet workbook and export each sheet to JSON
#[derive(Parser)]
#[command(
    name = "workbook-export",
    version,
    about = "Inspect a workbook and export each sheet to <sheet>_data.json"
)]
struct Cli {
    /// Workbook to read (.xlsx, .xlsm, .xlsb, .xls, .ods)
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Directory for the exported JSON files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// When to promote the first data row to the header
    #[arg(long, value_enum, default_value_t = HeaderMode::Auto)]
    header: HeaderMode,

    /// Column name that marks a title banner (used by `--header auto`)
    #[arg(long, default_value = DEFAULT_PLACEHOLDER_TITLE)]
    placeholder_title: String,

    /// Categorical column to list distinct values for (repeatable; default: Department, Job Role)
    #[arg(long = "category", value_name = "COLUMN")]
    categories: Vec<String>,

    /// Number of sample rows printed per sheet
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
    sample_rows: usize,

    /// Append export events to this log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Do not log export events to stderr
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeaderMode {
    /// Promote when a column is named after the placeholder title
    Auto,
    /// Always promote
    Always,
    /// Never promote
    Never,
}

impl Cli {
    fn into_options(self) -> ExportOptions {
        let header_policy = match self.header {
            HeaderMode::Auto => HeaderPolicy::Placeholder(self.placeholder_title),
            HeaderMode::Always => HeaderPolicy::Always,
            HeaderMode::Never => HeaderPolicy::Never,
        };
        let category_columns = if self.categories.is_empty() {
            DEFAULT_CATEGORY_COLUMNS.iter().map(|c| c.to_string()).collect()
        } else {
            self.categories
        };

        let mut observers: Vec<Arc<dyn ExportObserver>> = Vec::new();
        if !self.quiet {
            observers.push(Arc::new(StdErrObserver));
        }
        if let Some(path) = self.log_file {
            observers.push(Arc::new(FileObserver::new(path)));
        }
        let observer: Option<Arc<dyn ExportObserver>> = match observers.len() {
            0 => None,
            1 => observers.pop(),
            _ => Some(Arc::new(CompositeObserver::new(observers))),
        };

        ExportOptions {
            input: self.input,
            output_dir: self.output_dir,
            header_policy,
            category_columns,
            sample_rows: self.sample_rows,
            observer,
            ..Default::default()
        }
    }
}

fn main() -> ExitCode {
    let options = Cli::parse().into_options();

    match run(&options, io::stdout().lock()) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
