//! Workbook loading.
//!
//! [`Workbook::open`] opens an `.xlsx`/`.xlsm`/`.xlsb`/`.xls`/`.ods` file and keeps its sheet
//! names in workbook order. [`Workbook::load_sheet`] reads one sheet into a raw [`Table`]:
//!
//! - the first row of the sheet's used range supplies the column names
//! - empty header cells are named `Unnamed: <index>`
//! - repeated names get `.1`, `.2`, ... suffixes so that names are unique
//! - the remaining rows are converted into typed [`Value`]s

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{ExportError, ExportResult};
use crate::types::{Table, Value};

/// Workbook container formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// Office Open XML workbook.
    Xlsx,
    /// Macro-enabled Office Open XML workbook.
    Xlsm,
    /// Binary Office Open XML workbook.
    Xlsb,
    /// Legacy BIFF workbook.
    Xls,
    /// OpenDocument spreadsheet.
    Ods,
}

impl WorkbookFormat {
    /// Parse a workbook format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xlsm" => Some(Self::Xlsm),
            "xlsb" => Some(Self::Xlsb),
            "xls" => Some(Self::Xls),
            "ods" => Some(Self::Ods),
            _ => None,
        }
    }

    /// Infer the format of `path` from its extension.
    pub fn from_path(path: &Path) -> ExportResult<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| ExportError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }
}

/// An open workbook.
pub struct Workbook {
    path: PathBuf,
    format: WorkbookFormat,
    sheets: Sheets<BufReader<File>>,
    sheet_names: Vec<String>,
}

impl fmt::Debug for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbook")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("sheet_names", &self.sheet_names)
            .finish()
    }
}

impl Workbook {
    /// Open the workbook at `path`.
    ///
    /// Fails if the extension is not a workbook format, the file does not exist, or the file
    /// is not a readable workbook.
    pub fn open(path: impl AsRef<Path>) -> ExportResult<Self> {
        let path = path.as_ref();
        let format = WorkbookFormat::from_path(path)?;
        // Surface a missing file as plain I/O rather than a format-specific calamine error.
        fs::metadata(path)?;
        let sheets = open_workbook_auto(path)?;
        let sheet_names = sheets.sheet_names().to_vec();

        Ok(Self {
            path: path.to_path_buf(),
            format,
            sheets,
            sheet_names,
        })
    }

    /// Path the workbook was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detected container format.
    pub fn format(&self) -> WorkbookFormat {
        self.format
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Load sheet `name` into a raw [`Table`].
    pub fn load_sheet(&mut self, name: &str) -> ExportResult<Table> {
        let range = self.sheets.worksheet_range(name)?;
        Ok(table_from_range(&range))
    }
}

/// Build a raw table from a sheet range, using the first row as column names.
pub fn table_from_range(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let labels = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let label = cell_to_header_string(cell);
            if label.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                label
            }
        })
        .collect();
    let columns = dedupe_labels(labels);

    let data = rows
        .map(|row| row.iter().map(cell_to_value).collect())
        .collect();

    Table::new(columns, data)
}

/// Make column labels unique by suffixing repeats with `.1`, `.2`, ...
pub fn dedupe_labels(labels: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(labels.len());
    let mut repeats: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(labels.len());

    for label in labels {
        if used.insert(label.clone()) {
            out.push(label);
            continue;
        }
        let n = repeats.entry(label.clone()).or_insert(0);
        loop {
            *n += 1;
            let candidate = format!("{label}.{n}");
            if used.insert(candidate.clone()) {
                out.push(candidate);
                break;
            }
        }
    }
    out
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::Empty | Data::Error(_) => String::new(),
        other => cell_to_value(other).to_string(),
    }
}

/// Convert a calamine cell into a typed [`Value`].
///
/// Whole numbers become [`Value::Int64`]; date/time cells become [`Value::DateTime`] (honoring the
/// workbook's 1900/1904 date system) and elapsed-time cells become [`Value::Duration`].
pub fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => float_to_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::DateTime(dt) if dt.is_duration() => dt
            .as_duration()
            .map(Value::Duration)
            .unwrap_or(Value::Float64(dt.as_f64())),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Value::DateTime)
            .unwrap_or(Value::Float64(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::Utf8(s.clone())),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
    }
}

fn float_to_value(f: f64) -> Value {
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < I64_BOUND {
        Value::Int64(f as i64)
    } else {
        Value::Float64(f)
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
