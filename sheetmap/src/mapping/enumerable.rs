//! Many cells into one collection.

use std::fmt;
use std::sync::Arc;

use log::trace;

use super::property::{unbound, PropertyMap, PropertyMapKind};
use crate::error::MapResult;
use crate::pipeline::{CellPrimitive, EmptyValueStrategy, PipelineConfig, ValuePipeline};
use crate::readers::{CellReader, CellValues, CellsReader, DEFAULT_DELIMITER};
use crate::sheet::ExcelSheet;

/// Builds the member collection from the converted elements.
pub type CollectionFactory<E, C> = Arc<dyn Fn(Vec<E>) -> C + Send + Sync>;

/// Reads several cells (named columns, indices, or one split cell), converts
/// each through the element pipeline and collects them.
///
/// Fallbacks configured through [`PipelineConfig`] apply per element. The
/// collection-level empty fallback is used only when a split source cell is
/// empty; without one such a cell yields an empty collection.
pub struct ManyToOneEnumerablePropertyMap<E, C> {
    reader: Option<CellsReader>,
    delimiters: Vec<char>,
    pipeline: ValuePipeline<E>,
    factory: CollectionFactory<E, C>,
    empty_fallback: Option<C>,
}

impl<E: CellPrimitive, C: FromIterator<E> + 'static> ManyToOneEnumerablePropertyMap<E, C> {
    /// A map using the default element pipeline of `E`.
    pub fn new() -> Self {
        Self::with_pipeline(ValuePipeline::primitive())
    }
}

impl<E, C> Default for ManyToOneEnumerablePropertyMap<E, C>
where
    E: CellPrimitive,
    C: FromIterator<E> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static, C: FromIterator<E> + 'static> ManyToOneEnumerablePropertyMap<E, C> {
    /// A map collecting into `C` through [`FromIterator`].
    pub fn with_pipeline(pipeline: ValuePipeline<E>) -> Self {
        Self::with_factory(pipeline, |elements: Vec<E>| elements.into_iter().collect())
    }
}

impl<E, C> ManyToOneEnumerablePropertyMap<E, C> {
    /// A map collecting through a caller-supplied factory.
    pub fn with_factory<F>(pipeline: ValuePipeline<E>, factory: F) -> Self
    where
        F: Fn(Vec<E>) -> C + Send + Sync + 'static,
    {
        Self {
            reader: None,
            delimiters: vec![DEFAULT_DELIMITER],
            pipeline,
            factory: Arc::new(factory),
            empty_fallback: None,
        }
    }

    pub fn with_reader(mut self, reader: CellsReader) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn with_column_names<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_reader(CellsReader::column_names(names))
    }

    pub fn with_indices(self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.with_reader(CellsReader::Indices(indices.into_iter().collect()))
    }

    /// Split the named column.
    pub fn with_column_name(self, name: impl Into<String>) -> Self {
        let delimiters = self.delimiters.clone();
        self.with_reader(CellsReader::CharSplit {
            reader: CellReader::ColumnName(name.into()),
            delimiters,
        })
    }

    /// Split the column at `index`.
    pub fn with_index(self, index: usize) -> Self {
        let delimiters = self.delimiters.clone();
        self.with_reader(CellsReader::CharSplit {
            reader: CellReader::Index(index),
            delimiters,
        })
    }

    /// Replace the split delimiters, for the current split reader and the default one.
    pub fn with_delimiters(mut self, delimiters: impl IntoIterator<Item = char>) -> Self {
        self.delimiters = delimiters.into_iter().collect();
        if let Some(CellsReader::CharSplit { delimiters, .. }) = &mut self.reader {
            delimiters.clone_from(&self.delimiters);
        }
        self
    }

    /// The collection used when a split source cell is empty.
    pub fn with_empty_collection_fallback(mut self, value: C) -> Self {
        self.empty_fallback = Some(value);
        self
    }

    pub fn reader(&self) -> Option<&CellsReader> {
        self.reader.as_ref()
    }
}

impl<E, C> fmt::Debug for ManyToOneEnumerablePropertyMap<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManyToOneEnumerablePropertyMap")
            .field("reader", &self.reader)
            .field("delimiters", &self.delimiters)
            .field("pipeline", &self.pipeline)
            .field("empty_fallback", &self.empty_fallback.is_some())
            .finish()
    }
}

impl<E, C> PipelineConfig<E> for ManyToOneEnumerablePropertyMap<E, C>
where
    E: Clone + Send + Sync + 'static,
{
    fn pipeline_mut(&mut self) -> &mut ValuePipeline<E> {
        &mut self.pipeline
    }
}

impl<E, C> PropertyMap<C> for ManyToOneEnumerablePropertyMap<E, C>
where
    E: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn kind(&self) -> PropertyMapKind {
        PropertyMapKind::ManyToOneEnumerable
    }

    fn bind(&mut self, member: &str, strategy: EmptyValueStrategy) {
        if self.reader.is_none() {
            self.reader = Some(CellsReader::CharSplit {
                reader: CellReader::column_name(member),
                delimiters: self.delimiters.clone(),
            });
        }
        self.pipeline.apply_strategy(strategy);
    }

    fn read(&self, sheet: &ExcelSheet<'_>, row: usize) -> MapResult<C> {
        let reader = self.reader.as_ref().ok_or_else(|| unbound(self.kind()))?;

        let cells = match reader.read(sheet, row)? {
            CellValues::Empty(_) => {
                trace!("row {}: empty split source", row);
                return Ok(match &self.empty_fallback {
                    Some(value) => value.clone(),
                    None => (self.factory)(Vec::new()),
                });
            }
            CellValues::Cells(cells) => cells,
        };

        let elements = cells
            .iter()
            .map(|cell| self.pipeline.convert(cell))
            .collect::<MapResult<Vec<E>>>()?;
        Ok((self.factory)(elements))
    }
}
