//! Cell grids: the raw row/column source the mapping engine reads from.
//!
//! The engine only needs [`CellGrid`]. Loading CSV text or workbook files
//! into grids is handled by the [`csv`] and [`xlsx`] adapters, both of which
//! produce a [`MemoryGrid`].

pub mod csv;
pub mod xlsx;

use std::path::Path;

use crate::cell::CellValue;
use crate::error::{GridError, GridResult};

/// A rectangular grid of raw cell values for one sheet.
pub trait CellGrid {
    /// Sheet name as reported by the source.
    fn name(&self) -> &str;

    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// The cell at the given position, `None` when the source has no value there.
    fn cell(&self, row: usize, column: usize) -> Option<&CellValue>;
}

/// A grid held entirely in memory. Ragged rows are allowed; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryGrid {
    name: String,
    rows: Vec<Vec<CellValue>>,
    column_count: usize,
}

impl MemoryGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            name: name.into(),
            rows,
            column_count,
        }
    }

    /// Build a grid of text cells; blank strings become empty cells.
    pub fn from_text<R, C, S>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(CellValue::text).collect())
            .collect();
        Self::new(name, rows)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
}

impl CellGrid for MemoryGrid {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

/// Load every sheet of a file, choosing the adapter from the extension.
pub fn open_path<P: AsRef<Path>>(path: P) -> GridResult<Vec<MemoryGrid>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" | "tsv" | "txt" => Ok(vec![csv::parse_csv_file_auto(path)?.grid]),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => xlsx::open_workbook_grids(path),
        _ => Err(GridError::UnsupportedFormat(ext)),
    }
}
