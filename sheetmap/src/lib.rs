//! # Sheetmap - typed row mapping for spreadsheets
//!
//! Sheetmap reads the rows of CSV files and workbooks into strongly-typed
//! Rust values. Each member of a target type is bound to one or more cells
//! through a value pipeline with explicit fallbacks for empty and invalid
//! cells.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ CSV / XLSX  │────▶│  CellGrid   │────▶│ ExcelSheet  │────▶│  ClassMap   │────▶ T
//! │   (file)    │     │ (MemoryGrid)│     │ (heading,   │     │ (property   │
//! └─────────────┘     └─────────────┘     │  row cursor)│     │  maps)      │
//!                                         └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use sheetmap::{auto_map, ExcelImporter, MemoryGrid};
//!
//! #[derive(Debug, Default)]
//! struct Person {
//!     name: String,
//!     age: u32,
//!     nickname: Option<String>,
//! }
//! auto_map!(Person { name, age, nickname });
//!
//! let grid = MemoryGrid::from_text(
//!     "People",
//!     vec![vec!["name", "age", "nickname"], vec!["Ada", "36", ""]],
//! );
//! let mut importer = ExcelImporter::from_grid(grid);
//! importer.configuration_mut().set_auto_map(true);
//!
//! let mut sheet = importer.read_sheet().unwrap();
//! sheet.read_heading().unwrap();
//! let person: Person = sheet.read_auto_row().unwrap();
//! assert_eq!(person.age, 36);
//! assert_eq!(person.nickname, None);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`cell`] - Raw cell values
//! - [`grid`] - Cell grids and the CSV / workbook adapters
//! - [`pipeline`] - Mappers, transformers, fallbacks and value pipelines
//! - [`readers`] - Cell readers (by index, by name, split)
//! - [`mapping`] - Property maps, class maps and auto-mapping
//! - [`registry`] - Class maps per target type
//! - [`sheet`] - Heading and row cursor of one sheet
//! - [`importer`] - Workbook sheets and configuration
//! - [`logging`] - Console logger for the CLI

// Core modules
pub mod cell;
pub mod error;

// Sources
pub mod grid;

// Conversion
pub mod pipeline;
pub mod readers;

// Mapping
pub mod mapping;
pub mod registry;

// Reading
pub mod importer;
pub mod sheet;

// Logging
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, GridError, MapResult, MappingError};

// =============================================================================
// Re-exports - Cells and grids
// =============================================================================

pub use cell::{CellValue, ReadCell};
pub use grid::{open_path, CellGrid, MemoryGrid};

// =============================================================================
// Re-exports - Pipelines
// =============================================================================

pub use pipeline::{
    CellEnum, CellMapResult, CellPrimitive, CellValueMapper, CellValueTransformer,
    EmptyValueStrategy, FallbackItem, PipelineConfig, ValuePipeline,
};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{
    create_class_map, AutoMap, ClassMap, ManyToOneDictionaryPropertyMap,
    ManyToOneEnumerablePropertyMap, ManyToOneObjectPropertyMap, Mappable, OneToOnePropertyMap,
    PropertyMap, PropertyMapKind,
};
pub use readers::{CellReader, CellsReader};
pub use registry::MappingRegistry;

// =============================================================================
// Re-exports - Reading
// =============================================================================

pub use importer::{ExcelImporter, ImportOptions, ImporterConfiguration};
pub use sheet::{ExcelHeading, ExcelSheet};
