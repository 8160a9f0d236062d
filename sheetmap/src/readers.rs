//! Cell value readers: which cell(s) a property reads.
//!
//! [`CellReader`] yields one cell, [`CellsReader`] an ordered sequence.
//! By-name readers need the sheet heading; index readers are bounds-checked
//! against the sheet's column count. A column within bounds that has no cell
//! in a ragged row reads as empty.

use crate::cell::{CellValue, ReadCell};
use crate::error::{MapResult, MappingError};
use crate::sheet::ExcelSheet;

/// Delimiter used by char-split readers unless told otherwise.
pub const DEFAULT_DELIMITER: char = ',';

/// Reads a single cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellReader {
    Index(usize),
    ColumnName(String),
}

impl CellReader {
    pub fn column_name(name: impl Into<String>) -> Self {
        CellReader::ColumnName(name.into())
    }

    /// Resolve the column this reader points at.
    pub fn column(&self, sheet: &ExcelSheet<'_>) -> MapResult<usize> {
        match self {
            CellReader::Index(index) => check_index(sheet, *index),
            CellReader::ColumnName(name) => sheet
                .heading_required()?
                .index_of(name)
                .ok_or_else(|| MappingError::ColumnNotFound { name: name.clone() }),
        }
    }

    pub fn read(&self, sheet: &ExcelSheet<'_>, row: usize) -> MapResult<ReadCell> {
        let column = self.column(sheet)?;
        Ok(sheet.read_cell(row, column))
    }
}

fn check_index(sheet: &ExcelSheet<'_>, index: usize) -> MapResult<usize> {
    let columns = sheet.column_count();
    if index < columns {
        Ok(index)
    } else {
        Err(MappingError::ColumnIndexOutOfRange { index, columns })
    }
}

/// Cells produced by a [`CellsReader`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValues {
    /// The cell a char-split reader would have split was empty.
    Empty(ReadCell),
    Cells(Vec<ReadCell>),
}

/// Reads an ordered sequence of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellsReader {
    ColumnNames(Vec<String>),
    Indices(Vec<usize>),
    /// Every column of the sheet, in column order.
    AllColumns,
    /// One cell's text split on any of the delimiters.
    CharSplit {
        reader: CellReader,
        delimiters: Vec<char>,
    },
}

impl CellsReader {
    pub fn column_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CellsReader::ColumnNames(names.into_iter().map(Into::into).collect())
    }

    /// Split the cell of `reader` on commas.
    pub fn char_split(reader: CellReader) -> Self {
        CellsReader::CharSplit {
            reader,
            delimiters: vec![DEFAULT_DELIMITER],
        }
    }

    pub fn read(&self, sheet: &ExcelSheet<'_>, row: usize) -> MapResult<CellValues> {
        match self {
            CellsReader::CharSplit { reader, delimiters } => {
                let cell = reader.read(sheet, row)?;
                if cell.is_empty() {
                    return Ok(CellValues::Empty(cell));
                }
                Ok(CellValues::Cells(split_cell(&cell, delimiters)))
            }
            _ => {
                let columns = self.columns(sheet)?;
                Ok(CellValues::Cells(
                    columns
                        .into_iter()
                        .map(|(_, column)| sheet.read_cell(row, column))
                        .collect(),
                ))
            }
        }
    }

    /// Read cells together with their dictionary keys.
    ///
    /// Named columns and all-columns reads are keyed by heading name. Index
    /// reads use the heading name when a heading was read, else the index.
    /// Split tokens are keyed by position.
    pub fn read_keyed(
        &self,
        sheet: &ExcelSheet<'_>,
        row: usize,
    ) -> MapResult<Vec<(String, ReadCell)>> {
        match self {
            CellsReader::CharSplit { .. } => match self.read(sheet, row)? {
                CellValues::Empty(_) => Ok(Vec::new()),
                CellValues::Cells(cells) => Ok(cells
                    .into_iter()
                    .enumerate()
                    .map(|(position, cell)| (position.to_string(), cell))
                    .collect()),
            },
            _ => {
                let columns = self.columns(sheet)?;
                Ok(columns
                    .into_iter()
                    .map(|(key, column)| (key, sheet.read_cell(row, column)))
                    .collect())
            }
        }
    }

    /// Resolve the (key, column) pairs of a non-split reader.
    fn columns(&self, sheet: &ExcelSheet<'_>) -> MapResult<Vec<(String, usize)>> {
        match self {
            CellsReader::ColumnNames(names) => {
                let heading = sheet.heading_required()?;
                names
                    .iter()
                    .map(|name| {
                        heading
                            .index_of(name)
                            .map(|column| (name.clone(), column))
                            .ok_or_else(|| MappingError::ColumnNotFound { name: name.clone() })
                    })
                    .collect()
            }
            CellsReader::Indices(indices) => indices
                .iter()
                .map(|&index| {
                    let column = check_index(sheet, index)?;
                    let key = sheet
                        .heading()
                        .and_then(|heading| heading.name_at(column))
                        .map(str::to_string)
                        .unwrap_or_else(|| column.to_string());
                    Ok((key, column))
                })
                .collect(),
            CellsReader::AllColumns => {
                if sheet.expects_heading() {
                    let heading = sheet.heading_required()?;
                    Ok(heading
                        .column_names()
                        .iter()
                        .enumerate()
                        .map(|(column, name)| (name.clone(), column))
                        .collect())
                } else {
                    Ok((0..sheet.column_count())
                        .map(|column| (column.to_string(), column))
                        .collect())
                }
            }
            CellsReader::CharSplit { reader, .. } => {
                let column = reader.column(sheet)?;
                Ok(vec![(column.to_string(), column)])
            }
        }
    }
}

/// Split a cell's text on any delimiter, dropping empty trailing fragments.
/// Interior empty fragments become empty cells.
fn split_cell(cell: &ReadCell, delimiters: &[char]) -> Vec<ReadCell> {
    let text = cell.text();
    let mut tokens: Vec<&str> = text.split(|c: char| delimiters.contains(&c)).collect();
    while tokens.last().is_some_and(|token| token.is_empty()) {
        tokens.pop();
    }
    tokens
        .into_iter()
        .map(|token| cell.with_value(CellValue::text(token)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MemoryGrid;
    use crate::importer::ImporterConfiguration;

    fn grid() -> MemoryGrid {
        MemoryGrid::from_text(
            "Readers",
            vec![
                vec!["Name", "Tags", "X", "Y"],
                vec!["alice", "a,b;c", "1", "2"],
                vec!["bob", "", "3"],
                vec!["carol", "a,,b,,", "5", "6"],
            ],
        )
    }

    #[test]
    fn test_by_name_needs_heading() {
        let grid = grid();
        let config = ImporterConfiguration::default();
        let mut sheet = ExcelSheet::new(&grid, &config, 0);

        let err = CellReader::column_name("Name").read(&sheet, 1).unwrap_err();
        assert!(matches!(err, MappingError::HeaderNotRead { .. }));

        sheet.read_heading().unwrap();
        let cell = CellReader::column_name("Name").read(&sheet, 1).unwrap();
        assert_eq!(cell.value, CellValue::text("alice"));
        assert_eq!(cell.column, Some(0));

        let err = CellReader::column_name("Missing").read(&sheet, 1).unwrap_err();
        assert!(matches!(err, MappingError::ColumnNotFound { ref name } if name == "Missing"));
    }

    #[test]
    fn test_by_name_without_heading_is_unexpected() {
        let grid = grid();
        let mut config = ImporterConfiguration::default();
        config.set_has_heading(|_| false);
        let sheet = ExcelSheet::new(&grid, &config, 0);

        let err = CellReader::column_name("Name").read(&sheet, 0).unwrap_err();
        assert!(matches!(err, MappingError::HeaderNotExpected { .. }));
    }

    #[test]
    fn test_index_bounds_and_ragged_rows() {
        let grid = grid();
        let config = ImporterConfiguration::default();
        let sheet = ExcelSheet::new(&grid, &config, 0);

        // Row 2 is ragged: column 3 exists in the sheet but not in the row.
        assert!(CellReader::Index(3).read(&sheet, 2).unwrap().is_empty());

        let err = CellReader::Index(4).read(&sheet, 1).unwrap_err();
        assert!(matches!(err, MappingError::ColumnIndexOutOfRange { index: 4, columns: 4 }));
    }

    #[test]
    fn test_char_split() {
        let grid = grid();
        let config = ImporterConfiguration::default();
        let mut sheet = ExcelSheet::new(&grid, &config, 0);
        sheet.read_heading().unwrap();

        let reader = CellsReader::CharSplit {
            reader: CellReader::column_name("Tags"),
            delimiters: vec![',', ';'],
        };
        let CellValues::Cells(cells) = reader.read(&sheet, 1).unwrap() else {
            panic!("expected cells");
        };
        let texts: Vec<String> = cells.iter().map(ReadCell::text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert!(cells.iter().all(|c| c.column == Some(1)));

        assert!(matches!(reader.read(&sheet, 2).unwrap(), CellValues::Empty(_)));

        // Trailing empties dropped, interior empties kept as empty cells.
        let CellValues::Cells(cells) = reader.read(&sheet, 3).unwrap() else {
            panic!("expected cells");
        };
        assert_eq!(cells.len(), 3);
        assert!(cells[1].is_empty());
    }

    #[test]
    fn test_default_split_uses_comma_only() {
        let grid = grid();
        let config = ImporterConfiguration::default();
        let sheet = ExcelSheet::new(&grid, &config, 0);

        let reader = CellsReader::char_split(CellReader::Index(1));
        let CellValues::Cells(cells) = reader.read(&sheet, 1).unwrap() else {
            panic!("expected cells");
        };
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1].text(), "b;c");
    }

    #[test]
    fn test_keyed_reads() {
        let grid = grid();
        let config = ImporterConfiguration::default();
        let mut sheet = ExcelSheet::new(&grid, &config, 0);
        sheet.read_heading().unwrap();

        let keyed = CellsReader::AllColumns.read_keyed(&sheet, 1).unwrap();
        let keys: Vec<&str> = keyed.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Name", "Tags", "X", "Y"]);

        let keyed = CellsReader::Indices(vec![2, 3]).read_keyed(&sheet, 1).unwrap();
        assert_eq!(keyed[0].0, "X");
        assert_eq!(keyed[1].1.text(), "2");

        let keyed = CellsReader::column_names(["Y", "Name"]).read_keyed(&sheet, 3).unwrap();
        assert_eq!(keyed[0], ("Y".to_string(), ReadCell::new(3, Some(3), CellValue::text("6"))));
    }

    #[test]
    fn test_all_columns_without_heading_uses_indices() {
        let grid = grid();
        let mut config = ImporterConfiguration::default();
        config.set_has_heading(|_| false);
        let sheet = ExcelSheet::new(&grid, &config, 0);

        let keyed = CellsReader::AllColumns.read_keyed(&sheet, 0).unwrap();
        let keys: Vec<&str> = keyed.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["0", "1", "2", "3"]);
    }
}
