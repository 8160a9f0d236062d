//! The value pipeline for one target type.

use std::fmt;

use log::{trace, warn};

use super::fallback::{conversion_invalid, reconcile, EmptyValueStrategy, FallbackItem};
use super::mappers::MappingTableMapper;
use super::primitive::CellPrimitive;
use super::transformers::CellValueTransformer;
use super::{CellMapResult, CellValueMapper};
use crate::cell::ReadCell;
use crate::error::MapResult;

type Reconciler<T> = fn(EmptyValueStrategy, bool) -> FallbackItem<T>;

/// Transformers, an ordered list of mappers and the empty/invalid fallbacks
/// for one target type. Stateless across cells, so one pipeline serves every row.
pub struct ValuePipeline<T> {
    transformers: Vec<CellValueTransformer>,
    mappers: Vec<Box<dyn CellValueMapper<T>>>,
    empty_fallback: Option<FallbackItem<T>>,
    invalid_fallback: Option<FallbackItem<T>>,
    reconciler: Option<Reconciler<T>>,
}

impl<T> ValuePipeline<T> {
    /// A pipeline with no mappers and no fallbacks.
    pub fn new() -> Self {
        Self {
            transformers: Vec::new(),
            mappers: Vec::new(),
            empty_fallback: None,
            invalid_fallback: None,
            reconciler: None,
        }
    }

    pub fn transformers(&self) -> &[CellValueTransformer] {
        &self.transformers
    }

    pub fn mapper_count(&self) -> usize {
        self.mappers.len()
    }

    pub fn empty_fallback(&self) -> Option<&FallbackItem<T>> {
        self.empty_fallback.as_ref()
    }

    pub fn invalid_fallback(&self) -> Option<&FallbackItem<T>> {
        self.invalid_fallback.as_ref()
    }

    pub fn add_transformer(&mut self, transformer: CellValueTransformer) {
        self.transformers.push(transformer);
    }

    pub fn add_mapper(&mut self, mapper: Box<dyn CellValueMapper<T>>) {
        self.mappers.push(mapper);
    }

    /// Insert a mapper ahead of all others.
    pub fn prepend_mapper(&mut self, mapper: Box<dyn CellValueMapper<T>>) {
        self.mappers.insert(0, mapper);
    }

    pub fn set_mappers(&mut self, mappers: Vec<Box<dyn CellValueMapper<T>>>) {
        self.mappers = mappers;
    }

    pub fn set_empty_fallback(&mut self, fallback: FallbackItem<T>) {
        self.empty_fallback = Some(fallback);
    }

    pub fn set_invalid_fallback(&mut self, fallback: FallbackItem<T>) {
        self.invalid_fallback = Some(fallback);
    }

    /// Hand extra date formats to every mapper that accepts them.
    pub fn add_formats(&mut self, formats: &[String]) -> bool {
        let mut accepted = false;
        for mapper in &mut self.mappers {
            accepted |= mapper.add_formats(formats);
        }
        accepted
    }

    /// Fill unset fallback slots from a class-level strategy.
    ///
    /// Only primitive pipelines know how to reconcile; slots that were set
    /// explicitly are never overridden.
    pub fn apply_strategy(&mut self, strategy: EmptyValueStrategy) {
        let Some(reconcile) = self.reconciler else {
            return;
        };
        if self.empty_fallback.is_none() {
            self.empty_fallback = Some(reconcile(strategy, true));
        }
        if self.invalid_fallback.is_none() {
            self.invalid_fallback = Some(reconcile(strategy, false));
        }
    }

    fn transform(&self, cell: &ReadCell) -> ReadCell {
        self.transformers
            .iter()
            .fold(cell.clone(), |cell, transformer| transformer.transform_cell(cell))
    }
}

impl<T: Clone> ValuePipeline<T> {
    /// Convert one cell.
    ///
    /// Transformers run first. An empty result goes to the empty fallback;
    /// otherwise the first mapper that succeeds wins and the invalid fallback
    /// covers the rest. A missing fallback is a conversion failure.
    pub fn convert(&self, cell: &ReadCell) -> MapResult<T> {
        let cell = self.transform(cell);

        if cell.is_empty() {
            trace!("row {}: empty cell at column {:?}", cell.row, cell.column);
            return match &self.empty_fallback {
                Some(fallback) => fallback.perform(&cell),
                None => Err(conversion_invalid::<T>(&cell)),
            };
        }

        for mapper in &self.mappers {
            if let CellMapResult::Success(value) = mapper.map_cell_value(&cell) {
                return Ok(value);
            }
        }

        match &self.invalid_fallback {
            Some(fallback) => fallback.perform(&cell),
            None => Err(conversion_invalid::<T>(&cell)),
        }
    }
}

impl<P: CellPrimitive> ValuePipeline<P> {
    /// The default pipeline of a primitive: its own mapper, and fallbacks
    /// reconciled from `strategy` when bound.
    pub fn primitive() -> Self {
        let mut pipeline = Self::new();
        pipeline.mappers.push(P::default_mapper());
        pipeline.reconciler = Some(reconcile::<P>);
        pipeline
    }

    /// A primitive pipeline with fallbacks already reconciled.
    pub fn for_strategy(strategy: EmptyValueStrategy) -> Self {
        let mut pipeline = Self::primitive();
        pipeline.apply_strategy(strategy);
        pipeline
    }
}

impl<T> Default for ValuePipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ValuePipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuePipeline")
            .field("transformers", &self.transformers)
            .field("mappers", &self.mappers.len())
            .field("empty_fallback", &self.empty_fallback.is_some())
            .field("invalid_fallback", &self.invalid_fallback.is_some())
            .finish()
    }
}

/// By-value builder methods shared by everything that owns a value pipeline.
pub trait PipelineConfig<T: Clone + Send + Sync + 'static>: Sized {
    fn pipeline_mut(&mut self) -> &mut ValuePipeline<T>;

    fn with_transformer(mut self, transformer: CellValueTransformer) -> Self {
        self.pipeline_mut().add_transformer(transformer);
        self
    }

    fn with_trim(self) -> Self {
        self.with_transformer(CellValueTransformer::Trim)
    }

    /// Append a mapper, tried after the existing ones.
    fn with_mapper<M>(mut self, mapper: M) -> Self
    where
        M: CellValueMapper<T> + 'static,
    {
        self.pipeline_mut().add_mapper(Box::new(mapper));
        self
    }

    /// Replace all mappers.
    fn with_mappers(mut self, mappers: Vec<Box<dyn CellValueMapper<T>>>) -> Self {
        self.pipeline_mut().set_mappers(mappers);
        self
    }

    /// Consult a case-insensitive alias table before any other mapper.
    fn with_mapping<I, K>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
    {
        self.pipeline_mut()
            .prepend_mapper(Box::new(MappingTableMapper::new(mapping)));
        self
    }

    fn with_case_sensitive_mapping<I, K>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
    {
        self.pipeline_mut()
            .prepend_mapper(Box::new(MappingTableMapper::new(mapping).case_sensitive()));
        self
    }

    /// Accept extra date formats after the default ones, in the order given.
    fn with_additional_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let formats: Vec<String> = formats.into_iter().map(Into::into).collect();
        if !self.pipeline_mut().add_formats(&formats) {
            warn!("no date mapper accepted formats {:?}", formats);
        }
        self
    }

    fn with_empty_fallback(mut self, value: T) -> Self {
        self.pipeline_mut().set_empty_fallback(FallbackItem::FixedValue(value));
        self
    }

    fn with_invalid_fallback(mut self, value: T) -> Self {
        self.pipeline_mut().set_invalid_fallback(FallbackItem::FixedValue(value));
        self
    }

    /// Use `value` for both empty and invalid cells.
    fn with_value_fallback(self, value: T) -> Self {
        self.with_empty_fallback(value.clone()).with_invalid_fallback(value)
    }

    fn with_throwing_empty_fallback(mut self) -> Self {
        self.pipeline_mut().set_empty_fallback(FallbackItem::Throw);
        self
    }

    fn with_throwing_invalid_fallback(mut self) -> Self {
        self.pipeline_mut().set_invalid_fallback(FallbackItem::Throw);
        self
    }
}

impl<T: Clone + Send + Sync + 'static> PipelineConfig<T> for ValuePipeline<T> {
    fn pipeline_mut(&mut self) -> &mut ValuePipeline<T> {
        self
    }
}
