//! JSON export.
//!
//! A table is written as a JSON array of row objects (`[{"col": value, ...}, ...]`), keys in
//! column order. Date/time cells are rendered as ISO-8601 text.
//!
//! [`export_table`] writes to a temporary sibling file and renames it into place, so a failed
//! export never leaves a partial `<sheet>_data.json` behind and never clobbers an existing one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::ExportResult;
use crate::types::{Table, Value};

/// File name an exported sheet is written to.
pub fn export_file_name(sheet: &str) -> String {
    format!("{sheet}_data.json")
}

/// Serialize `table` to compact JSON (array of row objects).
pub fn to_json(table: &Table) -> ExportResult<Vec<u8>> {
    Ok(serde_json::to_vec(&Records(table))?)
}

/// Export `table` to `<output_dir>/<sheet>_data.json`, overwriting any existing file.
///
/// Returns the path written.
pub fn export_table(table: &Table, sheet: &str, output_dir: &Path) -> ExportResult<PathBuf> {
    let file_name = export_file_name(sheet);
    let target = output_dir.join(&file_name);
    let bytes = to_json(table)?;

    let tmp = output_dir.join(format!(".{file_name}.{}.tmp", std::process::id()));
    if let Err(e) = write_then_rename(&tmp, &target, &bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(target)
}

fn write_then_rename(tmp: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut f = File::create(tmp)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    drop(f);
    fs::rename(tmp, target)
}

struct Records<'a>(&'a Table);

impl Serialize for Records<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let table = self.0;
        let mut seq = serializer.serialize_seq(Some(table.row_count()))?;
        for row in &table.rows {
            seq.serialize_element(&Record {
                columns: &table.columns,
                row,
            })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    columns: &'a [String],
    row: &'a [Value],
}

impl Serialize for Record<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.row) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn people() -> Table {
        Table::new(
            vec!["Employee ID".to_string(), "Department".to_string(), "Hired".to_string()],
            vec![
                vec![
                    Value::Int64(1),
                    Value::Utf8("HR".to_string()),
                    Value::DateTime(
                        NaiveDate::from_ymd_opt(2020, 3, 1)
                            .unwrap()
                            .and_hms_opt(0, 0, 0)
                            .unwrap(),
                    ),
                ],
                vec![Value::Int64(2), Value::Null, Value::Null],
            ],
        )
    }

    #[test]
    fn file_name_uses_sheet_name() {
        assert_eq!(export_file_name("Raw"), "Raw_data.json");
        assert_eq!(export_file_name("Q1 Staff"), "Q1 Staff_data.json");
    }

    #[test]
    fn json_keeps_column_order_and_iso_dates() {
        let text = String::from_utf8(to_json(&people()).unwrap()).unwrap();
        assert_eq!(
            text,
            concat!(
                r#"[{"Employee ID":1,"Department":"HR","Hired":"2020-03-01T00:00:00.000"},"#,
                r#"{"Employee ID":2,"Department":null,"Hired":null}]"#
            )
        );
    }

    #[test]
    fn empty_table_exports_empty_array() {
        assert_eq!(to_json(&Table::default()).unwrap(), b"[]".to_vec());
    }
}
