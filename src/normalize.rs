//! Header normalization.
//!
//! Some workbooks put a title banner in the first row, so the real column names end up in the
//! first data row. [`normalize`] applies a [`HeaderPolicy`] to decide whether that row should be
//! promoted to the header.

use std::collections::HashSet;

use crate::error::{ExportError, ExportResult};
use crate::types::{Table, Value};

/// Title banner used by the employee workbooks this tool was built for.
pub const DEFAULT_PLACEHOLDER_TITLE: &str = "Sample Employee Data";

/// When to replace a sheet's column names with the values of its first data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Keep the column names as loaded.
    Never,
    /// Always promote the first data row.
    Always,
    /// Promote only if some column is named after the given placeholder title.
    Placeholder(String),
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self::Placeholder(DEFAULT_PLACEHOLDER_TITLE.to_string())
    }
}

impl HeaderPolicy {
    /// Returns `true` if `table` should have its first data row promoted.
    pub fn requires_promotion(&self, table: &Table) -> bool {
        match self {
            HeaderPolicy::Never => false,
            HeaderPolicy::Always => true,
            HeaderPolicy::Placeholder(title) => table.has_column(title),
        }
    }
}

/// A sheet table after header normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The normalized table.
    pub table: Table,
    /// Whether the first data row was promoted to the header.
    pub promoted: bool,
}

/// Apply `policy` to the raw table loaded from `sheet`.
///
/// When promotion is required and the first data row cannot serve as a header (no rows, an
/// empty cell, or a repeated name), this fails with [`ExportError::HeaderPromotion`] rather than
/// passing the table through.
pub fn normalize(sheet: &str, table: Table, policy: &HeaderPolicy) -> ExportResult<Normalized> {
    if !policy.requires_promotion(&table) {
        return Ok(Normalized {
            table,
            promoted: false,
        });
    }

    let table = promote_header(table).map_err(|message| ExportError::HeaderPromotion {
        sheet: sheet.to_string(),
        message,
    })?;
    Ok(Normalized {
        table,
        promoted: true,
    })
}

/// Use row 0 as the column names and drop it from the data.
pub fn promote_header(mut table: Table) -> Result<Table, String> {
    if table.rows.is_empty() {
        return Err("sheet has no data rows".to_string());
    }

    let header_row = table.rows.remove(0);
    let mut seen: HashSet<String> = HashSet::with_capacity(header_row.len());
    let mut columns: Vec<String> = Vec::with_capacity(header_row.len());

    for (idx, cell) in header_row.iter().enumerate() {
        let name = header_name(cell).ok_or_else(|| format!("header cell {idx} is empty"))?;
        if !seen.insert(name.clone()) {
            return Err(format!("duplicate header '{name}'"));
        }
        columns.push(name);
    }

    table.columns = columns;
    Ok(table)
}

fn header_name(cell: &Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::Utf8(s) if s.trim().is_empty() => None,
        other => Some(other.to_string()),
    }
}
