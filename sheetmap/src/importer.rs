//! Importer: the sheets of one workbook plus the configuration used to map them.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;

use crate::error::{ConfigResult, MapResult, MappingError};
use crate::grid::{self, csv, CellGrid, MemoryGrid};
use crate::mapping::ClassMap;
use crate::pipeline::{CellValueTransformer, EmptyValueStrategy};
use crate::registry::MappingRegistry;
use crate::sheet::ExcelSheet;

type HeadingPredicate = Box<dyn Fn(&dyn CellGrid) -> bool>;

// ============================================================================
// Configuration
// ============================================================================

/// Settings shared by every sheet of an importer, and its mapping registry.
pub struct ImporterConfiguration {
    has_heading: HeadingPredicate,
    auto_map: bool,
    empty_value_strategy: EmptyValueStrategy,
    transformers: Vec<CellValueTransformer>,
    registry: MappingRegistry,
}

impl Default for ImporterConfiguration {
    fn default() -> Self {
        Self {
            has_heading: Box::new(|_| true),
            auto_map: false,
            empty_value_strategy: EmptyValueStrategy::default(),
            transformers: Vec::new(),
            registry: MappingRegistry::new(),
        }
    }
}

impl ImporterConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide per sheet whether its first row is a heading.
    pub fn set_has_heading(
        &mut self,
        predicate: impl Fn(&dyn CellGrid) -> bool + 'static,
    ) -> &mut Self {
        self.has_heading = Box::new(predicate);
        self
    }

    pub fn has_heading(&self, grid: &dyn CellGrid) -> bool {
        (self.has_heading)(grid)
    }

    /// Allow class maps to be inferred for types that have none registered.
    pub fn set_auto_map(&mut self, enabled: bool) -> &mut Self {
        self.auto_map = enabled;
        self
    }

    pub fn auto_map(&self) -> bool {
        self.auto_map
    }

    /// Strategy given to inferred class maps.
    pub fn set_empty_value_strategy(&mut self, strategy: EmptyValueStrategy) -> &mut Self {
        self.empty_value_strategy = strategy;
        self
    }

    pub fn empty_value_strategy(&self) -> EmptyValueStrategy {
        self.empty_value_strategy
    }

    /// Add a transformer run on every data cell before its pipeline.
    pub fn add_transformer(&mut self, transformer: CellValueTransformer) -> &mut Self {
        self.transformers.push(transformer);
        self
    }

    pub fn transformers(&self) -> &[CellValueTransformer] {
        &self.transformers
    }

    pub fn register_mapping<T: 'static>(&mut self, map: ClassMap<T>) -> Arc<ClassMap<T>> {
        self.registry.register(map)
    }

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    /// Apply the options that were set; unset options keep their current value.
    /// Transformers are appended. `delimiter` and `sheet` are honoured by
    /// [`ExcelImporter::open_with_options`] and
    /// [`ExcelImporter::read_sheet_with_options`].
    pub fn apply_options(&mut self, options: &ImportOptions) -> &mut Self {
        if let Some(has_heading) = options.has_heading {
            self.set_has_heading(move |_| has_heading);
        }
        if let Some(auto_map) = options.auto_map {
            self.auto_map = auto_map;
        }
        if let Some(strategy) = options.empty_value_strategy {
            self.empty_value_strategy = strategy;
        }
        self.transformers.extend(options.transformers.iter().cloned());
        self
    }
}

impl std::fmt::Debug for ImporterConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImporterConfiguration")
            .field("auto_map", &self.auto_map)
            .field("empty_value_strategy", &self.empty_value_strategy)
            .field("transformers", &self.transformers)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Import options as read from a JSON file. Every field is optional.
///
/// ```json
/// {
///   "delimiter": ";",
///   "sheet": "Members",
///   "has_heading": true,
///   "auto_map": true,
///   "empty_value_strategy": "set_to_default_value",
///   "transformers": [{ "type": "trim" }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Field delimiter for delimited text files; detected when absent.
    pub delimiter: Option<char>,
    /// Sheet to read; the first sheet when absent.
    pub sheet: Option<String>,
    pub has_heading: Option<bool>,
    pub auto_map: Option<bool>,
    pub empty_value_strategy: Option<EmptyValueStrategy>,
    /// Transformers applied to every data cell before conversion.
    pub transformers: Vec<CellValueTransformer>,
}

impl ImportOptions {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

// ============================================================================
// Importer
// ============================================================================

/// The sheets of one source, read in order or addressed by name or index.
#[derive(Debug)]
pub struct ExcelImporter {
    grids: Vec<MemoryGrid>,
    configuration: ImporterConfiguration,
    next_sheet: usize,
}

impl ExcelImporter {
    pub fn new(grids: Vec<MemoryGrid>) -> Self {
        Self {
            grids,
            configuration: ImporterConfiguration::default(),
            next_sheet: 0,
        }
    }

    pub fn from_grid(grid: MemoryGrid) -> Self {
        Self::new(vec![grid])
    }

    /// Load every sheet of a CSV or workbook file.
    pub fn open<P: AsRef<Path>>(path: P) -> MapResult<Self> {
        let path = path.as_ref();
        let grids = grid::open_path(path)?;
        info!("opened {} ({} sheets)", path.display(), grids.len());
        Ok(Self::new(grids))
    }

    /// Load a file and apply `options`. An explicit delimiter overrides
    /// detection for delimited text files.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: &ImportOptions) -> MapResult<Self> {
        let path = path.as_ref();
        let is_text = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_lowercase().as_str(), "csv" | "tsv" | "txt"))
            .unwrap_or(false);

        let mut importer = match options.delimiter {
            Some(delimiter) if is_text => {
                debug!("reading {} with delimiter {:?}", path.display(), delimiter);
                Self::from_grid(csv::parse_csv_file(path, delimiter)?)
            }
            _ => Self::open(path)?,
        };
        importer.configuration.apply_options(options);
        Ok(importer)
    }

    pub fn configuration(&self) -> &ImporterConfiguration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut ImporterConfiguration {
        &mut self.configuration
    }

    pub fn sheet_count(&self) -> usize {
        self.grids.len()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.grids.iter().map(|g| g.name()).collect()
    }

    pub fn grids(&self) -> &[MemoryGrid] {
        &self.grids
    }

    /// The next sheet in workbook order.
    pub fn read_sheet(&mut self) -> MapResult<ExcelSheet<'_>> {
        let index = self.next_sheet;
        if index >= self.grids.len() {
            return Err(MappingError::SheetNotFound(format!(
                "#{} (workbook has {} sheets)",
                index,
                self.grids.len()
            )));
        }
        self.next_sheet += 1;
        Ok(ExcelSheet::new(&self.grids[index], &self.configuration, index))
    }

    pub fn read_sheet_named(&self, name: &str) -> MapResult<ExcelSheet<'_>> {
        let index = self
            .grids
            .iter()
            .position(|g| g.name() == name)
            .ok_or_else(|| MappingError::SheetNotFound(name.to_string()))?;
        Ok(ExcelSheet::new(&self.grids[index], &self.configuration, index))
    }

    pub fn read_sheet_at(&self, index: usize) -> MapResult<ExcelSheet<'_>> {
        let grid = self
            .grids
            .get(index)
            .ok_or_else(|| MappingError::SheetNotFound(format!("#{}", index)))?;
        Ok(ExcelSheet::new(grid, &self.configuration, index))
    }

    /// The sheet named by `options`, or the first sheet when none is named.
    pub fn read_sheet_with_options(&self, options: &ImportOptions) -> MapResult<ExcelSheet<'_>> {
        match &options.sheet {
            Some(name) => self.read_sheet_named(name),
            None => self.read_sheet_at(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::OneToOnePropertyMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Default)]
    struct Member {
        name: String,
        age: u32,
    }
    crate::auto_map!(Member { name, age });

    fn workbook() -> ExcelImporter {
        ExcelImporter::new(vec![
            MemoryGrid::from_text("People", vec![vec!["name", "age"], vec!["Ada", "36"]]),
            MemoryGrid::from_text("Raw", vec![vec!["Grace", "85"]]),
        ])
    }

    #[test]
    fn test_read_sheets_in_order() {
        let mut importer = workbook();
        assert_eq!(importer.sheet_count(), 2);
        assert_eq!(importer.sheet_names(), vec!["People", "Raw"]);

        assert_eq!(importer.read_sheet().unwrap().name(), "People");
        let second = importer.read_sheet().unwrap();
        assert_eq!((second.name(), second.index()), ("Raw", 1));
        assert!(matches!(importer.read_sheet(), Err(MappingError::SheetNotFound(_))));
    }

    #[test]
    fn test_read_sheet_by_name_and_index() {
        let importer = workbook();
        assert_eq!(importer.read_sheet_named("Raw").unwrap().index(), 1);
        assert_eq!(importer.read_sheet_at(0).unwrap().name(), "People");
        assert!(matches!(
            importer.read_sheet_named("Missing"),
            Err(MappingError::SheetNotFound(ref name)) if name == "Missing"
        ));
        assert!(importer.read_sheet_at(2).is_err());
    }

    #[test]
    fn test_registered_map_is_shared_across_sheets() {
        let mut importer = workbook();
        importer.configuration_mut().set_has_heading(|grid| grid.name() == "People");

        let mut map = ClassMap::<Member>::new();
        map.map("name", |m: &mut Member, v| m.name = v, OneToOnePropertyMap::new().with_index(0))
            .map("age", |m: &mut Member, v| m.age = v, OneToOnePropertyMap::new().with_index(1));
        importer.configuration_mut().register_mapping(map);

        let mut people = importer.read_sheet_at(0).unwrap();
        people.read_heading().unwrap();
        let ada = people.read_row::<Member>().unwrap();
        assert_eq!((ada.name.as_str(), ada.age), ("Ada", 36));

        let mut raw = importer.read_sheet_at(1).unwrap();
        let grace = raw.read_row::<Member>().unwrap();
        assert_eq!((grace.name.as_str(), grace.age), ("Grace", 85));
    }

    #[test]
    fn test_import_options_from_json() {
        let options = ImportOptions::from_json(
            r#"{
                "delimiter": ";",
                "has_heading": false,
                "auto_map": true,
                "empty_value_strategy": "set_to_default_value",
                "transformers": [{ "type": "trim" }]
            }"#,
        )
        .unwrap();

        assert_eq!(options.delimiter, Some(';'));
        assert_eq!(options.sheet, None);
        assert_eq!(options.transformers.len(), 1);

        let mut config = ImporterConfiguration::default();
        config.apply_options(&options);
        assert!(config.auto_map());
        assert_eq!(config.empty_value_strategy(), EmptyValueStrategy::SetToDefaultValue);
        assert!(!config.has_heading(&MemoryGrid::default()));
    }

    #[test]
    fn test_option_transformers_reach_rows() {
        let options = ImportOptions::from_json(
            r#"{
                "sheet": "Padded",
                "transformers": [{ "type": "trim" }, { "type": "uppercase" }]
            }"#,
        )
        .unwrap();

        let mut importer = ExcelImporter::new(vec![
            MemoryGrid::from_text("People", vec![vec!["name", "age"], vec!["Ada", "36"]]),
            MemoryGrid::from_text("Padded", vec![vec!["name", "age"], vec!["  grace ", " 85 "]]),
        ]);
        importer.configuration_mut().set_auto_map(true).apply_options(&options);
        assert_eq!(importer.configuration().transformers().len(), 2);

        let mut sheet = importer.read_sheet_with_options(&options).unwrap();
        assert_eq!(sheet.name(), "Padded");
        let heading = sheet.read_heading().unwrap();
        assert_eq!(heading.column_names(), ["name", "age"]);

        let member = sheet.read_auto_row::<Member>().unwrap();
        assert_eq!(member.name, "GRACE");
        assert_eq!(member.age, 85);
    }

    #[test]
    fn test_untransformed_rows_keep_whitespace() {
        let importer = ExcelImporter::from_grid(MemoryGrid::from_text(
            "Padded",
            vec![vec!["name"], vec!["  grace "]],
        ));
        let mut sheet = importer.read_sheet_with_options(&ImportOptions::default()).unwrap();
        sheet.read_heading().unwrap();
        assert_eq!(sheet.read_cell(1, 0).text(), "  grace ");
    }

    #[test]
    fn test_empty_options_change_nothing() {
        let options = ImportOptions::from_json("{}").unwrap();
        let mut config = ImporterConfiguration::default();
        config.apply_options(&options);

        assert!(!config.auto_map());
        assert!(config.has_heading(&MemoryGrid::default()));
    }

    #[test]
    fn test_invalid_options() {
        assert!(ImportOptions::from_json(r#"{"auto_map": "yes"}"#).is_err());
        assert!(ImportOptions::from_file("/nonexistent/options.json").is_err());
    }

    #[test]
    fn test_open_csv_with_options() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "name|age").unwrap();
        writeln!(file, "Linus|54").unwrap();

        let options = ImportOptions {
            delimiter: Some('|'),
            auto_map: Some(true),
            ..Default::default()
        };
        let mut importer = ExcelImporter::open_with_options(file.path(), &options).unwrap();
        let mut sheet = importer.read_sheet().unwrap();
        sheet.read_heading().unwrap();

        let member = sheet.read_auto_row::<Member>().unwrap();
        assert_eq!(member.name, "Linus");
        assert_eq!(member.age, 54);
    }
}
