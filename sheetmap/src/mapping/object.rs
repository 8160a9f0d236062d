//! A nested object read from the same row.

use std::sync::Arc;

use super::class_map::ClassMap;
use super::property::{PropertyMap, PropertyMapKind};
use crate::error::MapResult;
use crate::pipeline::EmptyValueStrategy;
use crate::sheet::ExcelSheet;

/// Runs a nested class map against the current row.
///
/// The nested map is already bound; binding this property changes nothing.
#[derive(Debug)]
pub struct ManyToOneObjectPropertyMap<T> {
    class_map: Arc<ClassMap<T>>,
}

impl<T> ManyToOneObjectPropertyMap<T> {
    pub fn new(class_map: ClassMap<T>) -> Self {
        Self::shared(Arc::new(class_map))
    }

    /// Reuse a class map that is also registered or nested elsewhere.
    pub fn shared(class_map: Arc<ClassMap<T>>) -> Self {
        Self { class_map }
    }

    pub fn class_map(&self) -> &ClassMap<T> {
        &self.class_map
    }
}

impl<T: Default + 'static> PropertyMap<T> for ManyToOneObjectPropertyMap<T> {
    fn kind(&self) -> PropertyMapKind {
        PropertyMapKind::ManyToOneObject
    }

    fn bind(&mut self, _member: &str, _strategy: EmptyValueStrategy) {}

    fn read(&self, sheet: &ExcelSheet<'_>, row: usize) -> MapResult<T> {
        self.class_map.read_row(sheet, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MemoryGrid;
    use crate::importer::ImporterConfiguration;
    use crate::mapping::OneToOnePropertyMap;

    #[derive(Debug, Default, PartialEq)]
    struct Address {
        city: String,
        zip: u32,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Customer {
        name: String,
        address: Address,
    }

    #[test]
    fn test_nested_object_reads_same_row() {
        let grid = MemoryGrid::from_text(
            "Customers",
            vec![vec!["name", "city", "zip"], vec!["Ada", "London", "12345"]],
        );
        let config = ImporterConfiguration::default();
        let mut sheet = ExcelSheet::new(&grid, &config, 0);
        sheet.read_heading().unwrap();

        let mut address = ClassMap::<Address>::new();
        address
            .map("city", |a, v| a.city = v, OneToOnePropertyMap::new())
            .map("zip", |a, v| a.zip = v, OneToOnePropertyMap::new());

        let mut customer = ClassMap::<Customer>::new();
        customer
            .map("name", |c, v| c.name = v, OneToOnePropertyMap::new())
            .map("address", |c, v| c.address = v, ManyToOneObjectPropertyMap::new(address));

        let value = customer.read_row(&sheet, 1).unwrap();
        assert_eq!(
            value,
            Customer {
                name: "Ada".into(),
                address: Address {
                    city: "London".into(),
                    zip: 12345
                },
            }
        );
    }
}
