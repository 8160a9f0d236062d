//! The value pipeline: how one cell becomes one typed value.
//!
//! ```text
//! ReadCell ──▶ transformers ──▶ empty? ──yes──▶ empty fallback
//!                                  │
//!                                  no
//!                                  ▼
//!                            mappers (first success wins) ──all invalid──▶ invalid fallback
//! ```
//!
//! - [`transformers`] - text rewrites applied before anything else
//! - [`mappers`] - cell value mappers for the well-known target types
//! - [`fallback`] - fallback items, the empty value strategy and reconciliation
//! - [`primitive`] - the [`CellPrimitive`] capability of well-known types
//! - [`value`] - [`ValuePipeline`] and its builder surface

pub mod fallback;
pub mod mappers;
pub mod primitive;
pub mod transformers;
pub mod value;

use crate::cell::ReadCell;

pub use fallback::{reconcile, EmptyValueStrategy, FallbackItem};
pub use mappers::{
    BoolMapper, DateMapper, DateTimeMapper, EnumMapper, FnMapper, GuidMapper, MappingTableMapper,
    NullableMapper, ParseMapper, StringMapper, UriMapper,
};
pub use primitive::{CellEnum, CellPrimitive};
pub use transformers::CellValueTransformer;
pub use value::{PipelineConfig, ValuePipeline};

/// Outcome of a single mapper attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CellMapResult<T> {
    Success(T),
    Invalid,
}

impl<T> CellMapResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, CellMapResult::Success(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            CellMapResult::Success(value) => Some(value),
            CellMapResult::Invalid => None,
        }
    }
}

impl<T> From<Option<T>> for CellMapResult<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => CellMapResult::Success(value),
            None => CellMapResult::Invalid,
        }
    }
}

/// Converts one non-empty cell into a candidate value of `T`.
///
/// Mappers never see empty cells; the pipeline routes those to its empty
/// fallback first.
pub trait CellValueMapper<T>: Send + Sync {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<T>;

    /// Accept extra date formats. Returns `false` when the mapper has no use for them.
    fn add_formats(&mut self, _formats: &[String]) -> bool {
        false
    }
}

impl<T> CellValueMapper<T> for Box<dyn CellValueMapper<T>> {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<T> {
        (**self).map_cell_value(cell)
    }

    fn add_formats(&mut self, formats: &[String]) -> bool {
        (**self).add_formats(formats)
    }
}
