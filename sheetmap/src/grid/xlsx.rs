//! Workbook grids (xlsx, xls, xlsb, ods) read through calamine.

use std::iter;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;
use log::debug;

use super::MemoryGrid;
use crate::cell::{excel_serial_to_datetime, CellValue};
use crate::error::GridResult;

/// Load every worksheet of a workbook, in workbook order.
///
/// Rows and columns are addressed from A1, whatever the used range.
pub fn open_workbook_grids<P: AsRef<Path>>(path: P) -> GridResult<Vec<MemoryGrid>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;

    let names = workbook.sheet_names();
    let mut grids = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        debug!(
            "workbook '{}': sheet '{}' ({} x {})",
            path.display(),
            name,
            range.height(),
            range.width()
        );
        grids.push(range_to_grid(&name, &range));
    }

    Ok(grids)
}

/// Convert a calamine range to a grid anchored at A1.
///
/// calamine ranges start at the first used cell, so the rows and columns
/// before it are padded with empty cells.
pub fn range_to_grid(name: &str, range: &Range<Data>) -> MemoryGrid {
    let (top, left) = range.start().unwrap_or((0, 0));
    let (top, left) = (top as usize, left as usize);
    let width = left + range.width();

    let mut rows: Vec<Vec<CellValue>> = vec![vec![CellValue::Empty; width]; top];
    rows.extend(range.rows().map(|row| {
        iter::repeat(CellValue::Empty)
            .take(left)
            .chain(row.iter().map(data_to_cell))
            .collect()
    }));
    MemoryGrid::new(name, rows)
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_datetime(serial)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Float(serial))
        }
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::text(s.as_str())),
        Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellGrid;
    use chrono::NaiveDate;

    #[test]
    fn test_range_to_grid() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 2));
        range.set_value((0, 0), Data::String("Id".into()));
        range.set_value((0, 1), Data::String("Name".into()));
        range.set_value((0, 2), Data::String("Active".into()));
        range.set_value((1, 0), Data::Float(7.0));
        range.set_value((1, 1), Data::String(String::new()));
        range.set_value((1, 2), Data::Bool(true));

        let grid = range_to_grid("Data", &range);
        assert_eq!(grid.name(), "Data");
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.cell(1, 0), Some(&CellValue::Float(7.0)));
        assert_eq!(grid.cell(1, 1), Some(&CellValue::Empty));
        assert_eq!(grid.cell(1, 2), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_offset_range_is_anchored_at_a1() {
        // Used range B2:C3
        let mut range: Range<Data> = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), Data::String("Id".into()));
        range.set_value((1, 2), Data::String("Name".into()));
        range.set_value((2, 1), Data::Int(7));
        range.set_value((2, 2), Data::String("Ada".into()));

        let grid = range_to_grid("Offset", &range);
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.cell(0, 0), Some(&CellValue::Empty));
        assert_eq!(grid.cell(0, 2), Some(&CellValue::Empty));
        assert_eq!(grid.cell(1, 0), Some(&CellValue::Empty));
        assert_eq!(grid.cell(1, 1), Some(&CellValue::text("Id")));
        assert_eq!(grid.cell(2, 1), Some(&CellValue::Int(7)));
        assert_eq!(grid.cell(2, 2), Some(&CellValue::text("Ada")));
    }

    #[test]
    fn test_iso_datetime_cells() {
        let cell = data_to_cell(&Data::DateTimeIso("2017-07-04T10:30:00".into()));
        let expected = NaiveDate::from_ymd_opt(2017, 7, 4)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(cell, CellValue::DateTime(expected));

        let cell = data_to_cell(&Data::DateTimeIso("not a date".into()));
        assert_eq!(cell, CellValue::text("not a date"));
    }

    #[test]
    fn test_missing_workbook_fails() {
        assert!(open_workbook_grids("/nonexistent/book.xlsx").is_err());
    }
}
