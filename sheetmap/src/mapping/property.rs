//! Property maps and the one-to-one variant.

use std::fmt;

use crate::error::{MapResult, MappingError};
use crate::pipeline::{CellPrimitive, EmptyValueStrategy, PipelineConfig, ValuePipeline};
use crate::readers::CellReader;
use crate::sheet::ExcelSheet;

/// The closed set of property map variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyMapKind {
    OneToOne,
    ManyToOneEnumerable,
    ManyToOneDictionary,
    ManyToOneObject,
}

impl fmt::Display for PropertyMapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyMapKind::OneToOne => "one-to-one",
            PropertyMapKind::ManyToOneEnumerable => "many-to-one enumerable",
            PropertyMapKind::ManyToOneDictionary => "many-to-one dictionary",
            PropertyMapKind::ManyToOneObject => "many-to-one object",
        };
        f.write_str(name)
    }
}

/// Produces one member value from one row.
///
/// A property map knows nothing about the type that owns the member; the
/// class map binds it to a member name and a setter.
pub trait PropertyMap<V>: Send + Sync {
    fn kind(&self) -> PropertyMapKind;

    /// Called once when the map is added to a class map. Fills in the default
    /// reader for `member` and the fallbacks the class strategy implies.
    fn bind(&mut self, member: &str, strategy: EmptyValueStrategy);

    fn read(&self, sheet: &ExcelSheet<'_>, row: usize) -> MapResult<V>;
}

impl<V> PropertyMap<V> for Box<dyn PropertyMap<V>> {
    fn kind(&self) -> PropertyMapKind {
        (**self).kind()
    }

    fn bind(&mut self, member: &str, strategy: EmptyValueStrategy) {
        (**self).bind(member, strategy)
    }

    fn read(&self, sheet: &ExcelSheet<'_>, row: usize) -> MapResult<V> {
        (**self).read(sheet, row)
    }
}

pub(crate) fn unbound(kind: PropertyMapKind) -> MappingError {
    MappingError::UnboundProperty {
        kind: kind.to_string(),
    }
}

/// Reads one cell through a value pipeline.
#[derive(Debug)]
pub struct OneToOnePropertyMap<T> {
    reader: Option<CellReader>,
    pipeline: ValuePipeline<T>,
}

impl<T: CellPrimitive> OneToOnePropertyMap<T> {
    /// A map using the default pipeline of `T`.
    pub fn new() -> Self {
        Self::with_pipeline(ValuePipeline::primitive())
    }
}

impl<T: CellPrimitive> Default for OneToOnePropertyMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OneToOnePropertyMap<T> {
    pub fn with_pipeline(pipeline: ValuePipeline<T>) -> Self {
        Self {
            reader: None,
            pipeline,
        }
    }

    pub fn with_reader(mut self, reader: CellReader) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn with_column_name(self, name: impl Into<String>) -> Self {
        self.with_reader(CellReader::ColumnName(name.into()))
    }

    pub fn with_index(self, index: usize) -> Self {
        self.with_reader(CellReader::Index(index))
    }

    pub fn reader(&self) -> Option<&CellReader> {
        self.reader.as_ref()
    }

    pub fn pipeline(&self) -> &ValuePipeline<T> {
        &self.pipeline
    }
}

impl<T: Clone + Send + Sync + 'static> PipelineConfig<T> for OneToOnePropertyMap<T> {
    fn pipeline_mut(&mut self) -> &mut ValuePipeline<T> {
        &mut self.pipeline
    }
}

impl<T: Clone + Send + Sync + 'static> PropertyMap<T> for OneToOnePropertyMap<T> {
    fn kind(&self) -> PropertyMapKind {
        PropertyMapKind::OneToOne
    }

    fn bind(&mut self, member: &str, strategy: EmptyValueStrategy) {
        if self.reader.is_none() {
            self.reader = Some(CellReader::column_name(member));
        }
        self.pipeline.apply_strategy(strategy);
    }

    fn read(&self, sheet: &ExcelSheet<'_>, row: usize) -> MapResult<T> {
        let reader = self.reader.as_ref().ok_or_else(|| unbound(self.kind()))?;
        let cell = reader.read(sheet, row)?;
        self.pipeline.convert(&cell)
    }
}
