//! Human-readable sheet diagnostics.
//!
//! [`Reporter`] writes to any [`Write`] sink (stdout in the binary). Output is meant for people,
//! not for parsing.

use std::collections::HashSet;
use std::io::{self, Write};
use std::path::Path;

use crate::error::ExportError;
use crate::types::{Table, Value};

/// Categorical columns whose distinct values are listed by default.
pub const DEFAULT_CATEGORY_COLUMNS: [&str; 2] = ["Department", "Job Role"];

/// Distinct values of `column` in first-occurrence order, or `None` if the column is missing.
///
/// Nulls count as a single distinct value.
pub fn unique_values<'a>(table: &'a Table, column: &str) -> Option<Vec<&'a Value>> {
    let idx = table.index_of(column)?;
    let mut seen: HashSet<String> = HashSet::new();
    let out = table
        .column_values(idx)
        .filter(|v| seen.insert(format!("{v:?}")))
        .collect();
    Some(out)
}

/// Render the first `n` rows of `table` as an aligned text table with a leading row index.
pub fn format_head(table: &Table, n: usize) -> String {
    let head = table.head(n);
    if head.is_empty() {
        return format!("Empty table\nColumns: {:?}\nIndex: []", table.columns);
    }

    let cells: Vec<Vec<String>> = head
        .iter()
        .map(|row| row.iter().map(Value::to_string).collect())
        .collect();

    let index_width = (head.len() - 1).to_string().len();
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(c, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(c))
                .map(|s| s.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(head.len() + 1);
    lines.push(render_line(" ".repeat(index_width), &table.columns, &widths));
    for (i, row) in cells.iter().enumerate() {
        lines.push(render_line(format!("{i:<index_width$}"), row, &widths));
    }
    lines.join("\n")
}

fn render_line(index: String, cells: &[String], widths: &[usize]) -> String {
    let mut line = index;
    for (cell, &width) in cells.iter().zip(widths) {
        line.push_str("  ");
        line.push_str(cell);
        line.extend(std::iter::repeat_n(' ', width.saturating_sub(cell.chars().count())));
    }
    line.trim_end().to_string()
}

/// Writes per-sheet diagnostics.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    sample_rows: usize,
    category_columns: Vec<String>,
}

impl<W: Write> Reporter<W> {
    /// Create a reporter that prints `sample_rows` sample rows and lists distinct values of
    /// `category_columns` when all of them are present.
    pub fn new(out: W, sample_rows: usize, category_columns: Vec<String>) -> Self {
        Self {
            out,
            sample_rows,
            category_columns,
        }
    }

    /// Consume the reporter and return the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print the workbook's sheet names.
    pub fn sheet_names(&mut self, names: &[String]) -> io::Result<()> {
        writeln!(self.out, "Sheet names: {names:?}")
    }

    /// Print the banner that starts a sheet's section.
    pub fn sheet_banner(&mut self, sheet: &str) -> io::Result<()> {
        writeln!(self.out, "\n--- {sheet} ---")
    }

    /// Print shape, columns, sample rows and categorical listings for a normalized table.
    pub fn table(&mut self, table: &Table) -> io::Result<()> {
        let (rows, cols) = table.shape();
        writeln!(self.out, "Shape: ({rows}, {cols})")?;
        writeln!(self.out, "Columns:")?;
        for col in &table.columns {
            writeln!(self.out, "  - {col}")?;
        }
        writeln!(self.out, "Sample data (first {} rows):", self.sample_rows)?;
        writeln!(self.out, "{}", format_head(table, self.sample_rows))?;

        if self.category_columns.is_empty()
            || !self.category_columns.iter().all(|c| table.has_column(c))
        {
            return Ok(());
        }
        for column in &self.category_columns {
            let values = unique_values(table, column).unwrap_or_default();
            writeln!(self.out, "\nUnique {column}s ({}):", values.len())?;
            for v in values {
                writeln!(self.out, "  - {v}")?;
            }
        }
        Ok(())
    }

    /// Print a successful export notice.
    pub fn export_saved(&mut self, path: &Path) -> io::Result<()> {
        writeln!(self.out, "\nSaved data to {}", path.display())
    }

    /// Print a failed export notice.
    pub fn export_failed(&mut self, error: &ExportError) -> io::Result<()> {
        writeln!(self.out, "\nError saving to JSON: {error}")
    }

    /// Print a notice for a sheet skipped before export.
    pub fn sheet_skipped(&mut self, error: &ExportError) -> io::Result<()> {
        writeln!(self.out, "Skipping sheet: {error}")
    }

    /// Print the end-of-run tally.
    pub fn summary(&mut self, exported: usize, total: usize) -> io::Result<()> {
        writeln!(self.out, "\nExported {exported}/{total} sheets")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::Utf8(v.to_string())
    }

    fn staff() -> Table {
        Table::new(
            vec!["Employee ID".to_string(), "Department".to_string(), "Job Role".to_string()],
            vec![
                vec![Value::Int64(1), s("Engineering"), s("Developer")],
                vec![Value::Int64(2), s("Sales"), s("Account Manager")],
                vec![Value::Int64(3), s("Engineering"), s("Developer")],
                vec![Value::Int64(4), Value::Null, s("Intern")],
                vec![Value::Int64(5), s("Sales"), s("Developer")],
                vec![Value::Int64(6), Value::Null, s("Intern")],
            ],
        )
    }

    fn render(table: &Table, categories: Vec<String>) -> String {
        let mut r = Reporter::new(Vec::new(), 5, categories);
        r.table(table).unwrap();
        String::from_utf8(r.into_inner()).unwrap()
    }

    fn default_categories() -> Vec<String> {
        DEFAULT_CATEGORY_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn unique_values_keep_first_occurrence_order() {
        let t = staff();
        let depts = unique_values(&t, "Department").unwrap();
        assert_eq!(depts, vec![&s("Engineering"), &s("Sales"), &Value::Null]);

        let roles = unique_values(&t, "Job Role").unwrap();
        assert_eq!(roles, vec![&s("Developer"), &s("Account Manager"), &s("Intern")]);

        assert!(unique_values(&t, "Location").is_none());
    }

    #[test]
    fn unique_values_distinguish_types() {
        let t = Table::new(
            vec!["v".to_string()],
            vec![vec![Value::Int64(1)], vec![s("1")], vec![Value::Int64(1)]],
        );
        assert_eq!(unique_values(&t, "v").unwrap().len(), 2);
    }

    #[test]
    fn head_renders_at_most_n_rows() {
        let text = format_head(&staff(), 5);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "   Employee ID  Department   Job Role");
        assert_eq!(lines[1], "0  1            Engineering  Developer");
        assert!(lines[5].starts_with("4  5"));
    }

    #[test]
    fn head_of_empty_table() {
        let t = Table::new(vec!["a".to_string()], vec![]);
        assert_eq!(format_head(&t, 5), "Empty table\nColumns: [\"a\"]\nIndex: []");
    }

    #[test]
    fn report_lists_shape_columns_and_categories() {
        let out = render(&staff(), default_categories());
        assert!(out.contains("Shape: (6, 3)"));
        assert!(out.contains("Columns:\n  - Employee ID\n  - Department\n  - Job Role\n"));
        assert!(out.contains("Unique Departments (3):\n  - Engineering\n  - Sales\n  - null\n"));
        assert!(out.contains("Unique Job Roles (3):\n  - Developer\n  - Account Manager\n  - Intern\n"));
    }

    #[test]
    fn report_skips_categories_when_a_column_is_missing() {
        let mut t = staff();
        t.columns[2] = "Title".to_string();
        let out = render(&t, default_categories());
        assert!(out.contains("Shape: (6, 3)"));
        assert!(!out.contains("Unique"));
    }
}
