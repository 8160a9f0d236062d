//! Error types for the sheetmap mapping engine.
//!
//! - [`GridError`] - failures of the cell-grid adapters (files, CSV, workbooks)
//! - [`MappingError`] - the single error surfaced by the mapping core
//! - [`ConfigError`] - failures loading import options
//!
//! Every core failure is synchronous and fatal to the current row or
//! operation. `GridError` converts into `MappingError` so `?` works across
//! the boundary.

use thiserror::Error;

// =============================================================================
// Grid Errors
// =============================================================================

/// Errors raised while loading a cell grid from a file or byte buffer.
#[derive(Debug, Error)]
pub enum GridError {
    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the bytes with the detected encoding.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Invalid CSV content.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook could not be opened or a worksheet could not be read.
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// The file extension does not name a supported format.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The input has no rows at all.
    #[error("Input is empty")]
    Empty,
}

impl From<calamine::Error> for GridError {
    fn from(err: calamine::Error) -> Self {
        GridError::Workbook(err.to_string())
    }
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// The error raised by heading reads, row reads and value conversion.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A column was addressed by name before the heading was read.
    #[error("The heading of sheet '{sheet}' has not been read")]
    HeaderNotRead { sheet: String },

    /// The heading was read a second time.
    #[error("The heading of sheet '{sheet}' has already been read")]
    HeaderAlreadyRead { sheet: String },

    /// The sheet is configured to have no heading.
    #[error("Sheet '{sheet}' is configured without a heading")]
    HeaderNotExpected { sheet: String },

    /// No column with the given name exists in the heading.
    #[error("Column '{name}' not found in heading")]
    ColumnNotFound { name: String },

    /// A column index is outside of the sheet's columns.
    #[error("Column index {index} is out of range (sheet has {columns} columns)")]
    ColumnIndexOutOfRange { index: usize, columns: usize },

    /// No class map was registered (or inferred) for the requested type.
    #[error("No mapping registered for type '{type_name}'")]
    NoMappingRegistered { type_name: &'static str },

    /// A cell could not be converted and no fallback resolved it.
    #[error("Row {row}{}: cannot convert '{value}' to {target}", column_suffix(.column))]
    ConversionInvalid {
        row: usize,
        column: Option<usize>,
        value: String,
        target: &'static str,
    },

    /// A member of an auto-mapped type has a shape that cannot be classified.
    #[error("Cannot auto-map member '{member}' of type '{type_name}': {reason}")]
    AutoMappingFailed {
        type_name: &'static str,
        member: String,
        reason: String,
    },

    /// Two cells produced the same dictionary key.
    #[error("Duplicate dictionary key '{key}'")]
    DuplicateDictionaryKey { key: String },

    /// A row was requested after the last row of the sheet.
    #[error("Sheet '{sheet}' has no more rows (last row index {last})")]
    NoMoreRows { sheet: String, last: usize },

    /// A property map was read before being added to a class map.
    #[error("A {kind} property map was read before being bound to a member")]
    UnboundProperty { kind: String },

    /// The importer has no sheet with the given name or index.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// The underlying grid failed.
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors raised while loading [`ImportOptions`](crate::importer::ImportOptions).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the options file.
    #[error("Failed to read options: {0}")]
    Io(#[from] std::io::Error),

    /// The options are not valid JSON for the expected shape.
    #[error("Invalid options: {0}")]
    Json(#[from] serde_json::Error),
}

fn column_suffix(column: &Option<usize>) -> String {
    match column {
        Some(index) => format!(", column {}", index),
        None => String::new(),
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for grid loading.
pub type GridResult<T> = Result<T, GridError>;

/// Result type for mapping operations.
pub type MapResult<T> = Result<T, MappingError>;

/// Result type for option loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_error_converts_to_mapping_error() {
        let err: MappingError = GridError::Empty.into();
        assert!(matches!(err, MappingError::Grid(GridError::Empty)));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_conversion_invalid_format() {
        let err = MappingError::ConversionInvalid {
            row: 4,
            column: Some(2),
            value: "abc".into(),
            target: "i32",
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 4, column 2"));
        assert!(msg.contains("'abc'"));
        assert!(msg.contains("i32"));

        let err = MappingError::ConversionInvalid {
            row: 1,
            column: None,
            value: String::new(),
            target: "bool",
        };
        assert_eq!(err.to_string(), "Row 1: cannot convert '' to bool");
    }
}
