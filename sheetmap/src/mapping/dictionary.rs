//! Many cells into one keyed map.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::property::{unbound, PropertyMap, PropertyMapKind};
use crate::error::{MapResult, MappingError};
use crate::pipeline::{CellPrimitive, EmptyValueStrategy, PipelineConfig, ValuePipeline};
use crate::readers::CellsReader;
use crate::sheet::ExcelSheet;

/// Builds the member map from key/value pairs that are known to be unique.
pub type DictionaryFactory<V, D> = Arc<dyn Fn(Vec<(String, V)>) -> D + Send + Sync>;

/// Reads keyed cells (all columns by default), converts each value through
/// the value pipeline and builds the map. A repeated key fails the read.
pub struct ManyToOneDictionaryPropertyMap<V, D> {
    reader: Option<CellsReader>,
    pipeline: ValuePipeline<V>,
    factory: DictionaryFactory<V, D>,
}

impl<V, D> ManyToOneDictionaryPropertyMap<V, D>
where
    V: CellPrimitive,
    D: FromIterator<(String, V)> + 'static,
{
    pub fn new() -> Self {
        Self::with_pipeline(ValuePipeline::primitive())
    }
}

impl<V: CellPrimitive, D: FromIterator<(String, V)> + 'static> Default
    for ManyToOneDictionaryPropertyMap<V, D>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V: 'static, D: FromIterator<(String, V)> + 'static> ManyToOneDictionaryPropertyMap<V, D> {
    pub fn with_pipeline(pipeline: ValuePipeline<V>) -> Self {
        Self::with_factory(pipeline, |pairs: Vec<(String, V)>| pairs.into_iter().collect())
    }
}

impl<V, D> ManyToOneDictionaryPropertyMap<V, D> {
    pub fn with_factory<F>(pipeline: ValuePipeline<V>, factory: F) -> Self
    where
        F: Fn(Vec<(String, V)>) -> D + Send + Sync + 'static,
    {
        Self {
            reader: None,
            pipeline,
            factory: Arc::new(factory),
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

    pub fn reader(&self) -> Option<&CellsReader> {
        self.reader.as_ref()
    }
}

impl<V, D> fmt::Debug for ManyToOneDictionaryPropertyMap<V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManyToOneDictionaryPropertyMap")
            .field("reader", &self.reader)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl<V, D> PipelineConfig<V> for ManyToOneDictionaryPropertyMap<V, D>
where
    V: Clone + Send + Sync + 'static,
{
    fn pipeline_mut(&mut self) -> &mut ValuePipeline<V> {
        &mut self.pipeline
    }
}

impl<V, D> PropertyMap<D> for ManyToOneDictionaryPropertyMap<V, D>
where
    V: Clone + Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    fn kind(&self) -> PropertyMapKind {
        PropertyMapKind::ManyToOneDictionary
    }

    fn bind(&mut self, _member: &str, strategy: EmptyValueStrategy) {
        if self.reader.is_none() {
            self.reader = Some(CellsReader::AllColumns);
        }
        self.pipeline.apply_strategy(strategy);
    }

    fn read(&self, sheet: &ExcelSheet<'_>, row: usize) -> MapResult<D> {
        let reader = self.reader.as_ref().ok_or_else(|| unbound(self.kind()))?;
        let keyed = reader.read_keyed(sheet, row)?;

        let mut seen = HashSet::with_capacity(keyed.len());
        let mut pairs = Vec::with_capacity(keyed.len());
        for (key, cell) in keyed {
            if !seen.insert(key.clone()) {
                return Err(MappingError::DuplicateDictionaryKey { key });
            }
            let value = self.pipeline.convert(&cell)?;
            pairs.push((key, value));
        }

        Ok((self.factory)(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MemoryGrid;
    use crate::importer::ImporterConfiguration;
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn test_all_columns() {
        let grid = MemoryGrid::from_text("D", vec![vec!["X", "Y"], vec!["1", "2"]]);
        let config = ImporterConfiguration::default();
        let mut sheet = ExcelSheet::new(&grid, &config, 0);
        sheet.read_heading().unwrap();

        let mut map = ManyToOneDictionaryPropertyMap::<i32, HashMap<String, i32>>::new();
        map.bind("values", EmptyValueStrategy::ThrowIfPrimitive);

        let values = map.read(&sheet, 1).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["X"], 1);
        assert_eq!(values["Y"], 2);
    }

    #[test]
    fn test_duplicate_heading_name_fails() {
        let grid = MemoryGrid::from_text("D", vec![vec!["X", "X"], vec!["1", "2"]]);
        let config = ImporterConfiguration::default();
        let mut sheet = ExcelSheet::new(&grid, &config, 0);
        sheet.read_heading().unwrap();

        let mut map = ManyToOneDictionaryPropertyMap::<i32, BTreeMap<String, i32>>::new();
        map.bind("values", EmptyValueStrategy::ThrowIfPrimitive);

        let err = map.read(&sheet, 1).unwrap_err();
        assert!(matches!(err, MappingError::DuplicateDictionaryKey { ref key } if key == "X"));
    }

    #[test]
    fn test_selected_columns_with_nullable_values() {
        let grid = MemoryGrid::from_text(
            "D",
            vec![vec!["Id", "X", "Y"], vec!["7", "", "b"]],
        );
        let config = ImporterConfiguration::default();
        let mut sheet = ExcelSheet::new(&grid, &config, 0);
        sheet.read_heading().unwrap();

        type Values = BTreeMap<String, Option<String>>;
        let mut map =
            ManyToOneDictionaryPropertyMap::<Option<String>, Values>::new().with_indices([1, 2]);
        map.bind("values", EmptyValueStrategy::ThrowIfPrimitive);

        let values = map.read(&sheet, 1).unwrap();
        assert_eq!(values.get("X"), Some(&None));
        assert_eq!(values.get("Y"), Some(&Some("b".to_string())));
        assert!(!values.contains_key("Id"));
    }

    #[test]
    fn test_conversion_failure_propagates() {
        let grid = MemoryGrid::from_text("D", vec![vec!["X"], vec!["nope"]]);
        let config = ImporterConfiguration::default();
        let mut sheet = ExcelSheet::new(&grid, &config, 0);
        sheet.read_heading().unwrap();

        let mut map = ManyToOneDictionaryPropertyMap::<i32, HashMap<String, i32>>::new();
        map.bind("values", EmptyValueStrategy::SetToDefaultValue);
        assert_eq!(map.read(&sheet, 1).unwrap()["X"], 0);

        let mut strict = ManyToOneDictionaryPropertyMap::<i32, HashMap<String, i32>>::new();
        strict.bind("values", EmptyValueStrategy::ThrowIfPrimitive);
        assert!(matches!(
            strict.read(&sheet, 1),
            Err(MappingError::ConversionInvalid { .. })
        ));
    }
}
