//! One sheet of a workbook: heading, row cursor and typed row reads.
//!
//! Rows are read in order through a cursor that only moves forward. When the
//! sheet has a heading, it must be read before any row:
//!
//! ```text
//! ExcelSheet::new ─► read_heading() ─► read_row::<T>() ─► ... ─► NoMoreRows
//!                    (row 0)           (row 1)
//! ```

use std::any::type_name;
use std::sync::Arc;

use log::{debug, trace};

use crate::cell::{CellValue, ReadCell};
use crate::error::{MapResult, MappingError};
use crate::grid::CellGrid;
use crate::importer::ImporterConfiguration;
use crate::mapping::{AutoMap, ClassMap};

// ============================================================================
// Heading
// ============================================================================

/// Column names captured from the first row of a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcelHeading {
    column_names: Vec<String>,
}

impl ExcelHeading {
    pub fn new(column_names: Vec<String>) -> Self {
        Self { column_names }
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Index of the first column with exactly this name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.column_names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.column_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.column_names.is_empty()
    }
}

// ============================================================================
// Sheet
// ============================================================================

/// A cursor over the rows of one grid, mapping them with the class maps of
/// the importer configuration.
pub struct ExcelSheet<'a> {
    grid: &'a dyn CellGrid,
    configuration: &'a ImporterConfiguration,
    index: usize,
    has_heading: bool,
    heading: Option<ExcelHeading>,
    next_row: usize,
    current_row: Option<usize>,
}

impl<'a> ExcelSheet<'a> {
    pub fn new(
        grid: &'a dyn CellGrid,
        configuration: &'a ImporterConfiguration,
        index: usize,
    ) -> Self {
        let has_heading = configuration.has_heading(grid);
        debug!(
            "opened sheet '{}' ({} rows, {} columns, heading: {})",
            grid.name(),
            grid.row_count(),
            grid.column_count(),
            has_heading
        );
        Self {
            grid,
            configuration,
            index,
            has_heading,
            heading: None,
            next_row: 0,
            current_row: None,
        }
    }

    pub fn name(&self) -> &str {
        self.grid.name()
    }

    /// Position of the sheet in its workbook.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.grid.column_count()
    }

    pub fn configuration(&self) -> &ImporterConfiguration {
        self.configuration
    }

    /// The cell at a position; cells the grid does not have read as empty.
    pub fn cell(&self, row: usize, column: usize) -> ReadCell {
        let value = self.grid.cell(row, column).cloned().unwrap_or(CellValue::Empty);
        ReadCell::new(row, Some(column), value)
    }

    /// The cell at a position after the configured transformers, as the
    /// property maps see it. Heading names are read untransformed.
    pub fn read_cell(&self, row: usize, column: usize) -> ReadCell {
        self.configuration
            .transformers()
            .iter()
            .fold(self.cell(row, column), |cell, transformer| transformer.transform_cell(cell))
    }

    pub fn expects_heading(&self) -> bool {
        self.has_heading
    }

    pub fn heading(&self) -> Option<&ExcelHeading> {
        self.heading.as_ref()
    }

    /// The heading, or why by-name lookups cannot work yet.
    pub fn heading_required(&self) -> MapResult<&ExcelHeading> {
        match &self.heading {
            Some(heading) => Ok(heading),
            None if self.has_heading => Err(MappingError::HeaderNotRead {
                sheet: self.name().to_string(),
            }),
            None => Err(MappingError::HeaderNotExpected {
                sheet: self.name().to_string(),
            }),
        }
    }

    /// Read the first row as column names. Allowed once, and only on sheets
    /// that have a heading.
    pub fn read_heading(&mut self) -> MapResult<&ExcelHeading> {
        if !self.has_heading {
            return Err(MappingError::HeaderNotExpected {
                sheet: self.name().to_string(),
            });
        }
        if self.heading.is_some() {
            return Err(MappingError::HeaderAlreadyRead {
                sheet: self.name().to_string(),
            });
        }

        let names: Vec<String> = (0..self.column_count())
            .map(|column| self.cell(0, column).text())
            .collect();
        debug!("sheet '{}': heading {:?}", self.name(), names);

        self.next_row = 1;
        Ok(self.heading.insert(ExcelHeading::new(names)))
    }

    /// Index of the row most recently read, if any.
    pub fn current_row_index(&self) -> Option<usize> {
        self.current_row
    }

    pub fn has_more_rows(&self) -> bool {
        self.next_row < self.row_count()
    }

    // ------------------------------------------------------------------------
    // Row reads
    // ------------------------------------------------------------------------

    /// Read the next row with the class map registered for `T`.
    pub fn read_row<T: Default + 'static>(&mut self) -> MapResult<T> {
        let map = self.registered::<T>()?;
        self.read_row_with(&map)
    }

    /// Read the next row with the registered map of `T`, inferring one when
    /// auto-mapping is enabled.
    pub fn read_auto_row<T: AutoMap>(&mut self) -> MapResult<T> {
        let map = self.auto_map::<T>()?;
        self.read_row_with(&map)
    }

    /// Read the next row with an explicit class map.
    pub fn read_row_with<T: Default>(&mut self, map: &ClassMap<T>) -> MapResult<T> {
        let row = self.advance()?;
        trace!("sheet '{}': reading row {} as {}", self.name(), row, type_name::<T>());
        map.read_row(self, row)
    }

    /// Like [`read_row`](Self::read_row) but `None` once every row is read.
    pub fn try_read_row<T: Default + 'static>(&mut self) -> MapResult<Option<T>> {
        let map = self.registered::<T>()?;
        self.try_read_row_with(&map)
    }

    pub fn try_read_row_with<T: Default>(&mut self, map: &ClassMap<T>) -> MapResult<Option<T>> {
        if self.has_heading && self.heading.is_none() {
            return Err(MappingError::HeaderNotRead {
                sheet: self.name().to_string(),
            });
        }
        if !self.has_more_rows() {
            return Ok(None);
        }
        self.read_row_with(map).map(Some)
    }

    /// Every remaining row, with the registered map of `T`.
    pub fn read_rows<T: Default + 'static>(&mut self) -> MapResult<Vec<T>> {
        let map = self.registered::<T>()?;
        self.read_rows_with(&map)
    }

    /// Every remaining row, inferring the map of `T` when allowed.
    pub fn read_auto_rows<T: AutoMap>(&mut self) -> MapResult<Vec<T>> {
        let map = self.auto_map::<T>()?;
        self.read_rows_with(&map)
    }

    pub fn read_rows_with<T: Default>(&mut self, map: &ClassMap<T>) -> MapResult<Vec<T>> {
        let mut rows = Vec::with_capacity(self.row_count().saturating_sub(self.next_row));
        while let Some(row) = self.try_read_row_with(map)? {
            rows.push(row);
        }
        Ok(rows)
    }

    fn registered<T: 'static>(&self) -> MapResult<Arc<ClassMap<T>>> {
        self.configuration
            .registry()
            .get::<T>()
            .ok_or(MappingError::NoMappingRegistered {
                type_name: type_name::<T>(),
            })
    }

    fn auto_map<T: AutoMap>(&self) -> MapResult<Arc<ClassMap<T>>> {
        let registry = self.configuration.registry();
        if let Some(map) = registry.get::<T>() {
            return Ok(map);
        }
        if !self.configuration.auto_map() {
            return Err(MappingError::NoMappingRegistered {
                type_name: type_name::<T>(),
            });
        }
        registry.get_or_infer::<T>(self.configuration.empty_value_strategy())
    }

    /// Move the cursor to the next row. The cursor moves even if mapping
    /// that row later fails.
    fn advance(&mut self) -> MapResult<usize> {
        if self.has_heading && self.heading.is_none() {
            return Err(MappingError::HeaderNotRead {
                sheet: self.name().to_string(),
            });
        }
        if !self.has_more_rows() {
            return Err(MappingError::NoMoreRows {
                sheet: self.name().to_string(),
                last: self.row_count().saturating_sub(1),
            });
        }

        let row = self.next_row;
        self.next_row += 1;
        self.current_row = Some(row);
        Ok(row)
    }
}

impl std::fmt::Debug for ExcelSheet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExcelSheet")
            .field("name", &self.name())
            .field("index", &self.index)
            .field("has_heading", &self.has_heading)
            .field("heading", &self.heading)
            .field("next_row", &self.next_row)
            .finish()
    }
}
