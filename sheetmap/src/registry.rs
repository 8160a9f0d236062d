//! Class maps registered per target type.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::MapResult;
use crate::mapping::{create_class_map, AutoMap, ClassMap};
use crate::pipeline::EmptyValueStrategy;

type Entry = Arc<dyn Any + Send + Sync>;

/// At most one class map per type. Registering again replaces the map.
///
/// Inferred maps are cached on first use, so lookups take `&self`.
#[derive(Default)]
pub struct MappingRegistry {
    maps: RefCell<HashMap<TypeId, Entry>>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: 'static>(&self, map: ClassMap<T>) -> Arc<ClassMap<T>> {
        let map = Arc::new(map);
        let previous = self
            .maps
            .borrow_mut()
            .insert(TypeId::of::<T>(), map.clone() as Entry);
        if previous.is_some() {
            debug!("replaced class map for {}", type_name::<T>());
        } else {
            debug!("registered class map for {} ({} members)", type_name::<T>(), map.len());
        }
        map
    }

    pub fn get<T: 'static>(&self) -> Option<Arc<ClassMap<T>>> {
        let entry = self.maps.borrow().get(&TypeId::of::<T>()).cloned()?;
        entry.downcast::<ClassMap<T>>().ok()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.maps.borrow().contains_key(&TypeId::of::<T>())
    }

    /// The registered map of `T`, or a map inferred now and registered.
    pub fn get_or_infer<T: AutoMap>(
        &self,
        strategy: EmptyValueStrategy,
    ) -> MapResult<Arc<ClassMap<T>>> {
        if let Some(map) = self.get::<T>() {
            return Ok(map);
        }

        info!("inferring class map for {}", type_name::<T>());
        match create_class_map::<T>(strategy) {
            Ok(map) => Ok(self.register(map)),
            Err(err) => {
                warn!("auto-mapping {} failed: {}", type_name::<T>(), err);
                Err(err)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.maps.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.borrow().is_empty()
    }
}

impl std::fmt::Debug for MappingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingRegistry").field("maps", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;
    use crate::mapping::OneToOnePropertyMap;

    #[derive(Debug, Default)]
    struct Point {
        x: i32,
        y: i32,
    }
    crate::auto_map!(Point { x, y });

    #[derive(Debug, Default)]
    struct Broken {
        grid: Vec<Vec<u8>>,
    }
    crate::auto_map!(Broken { grid });

    #[test]
    fn test_register_and_get() {
        let registry = MappingRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get::<Point>().is_none());

        let mut map = ClassMap::<Point>::new();
        map.map("x", |p: &mut Point, v| p.x = v, OneToOnePropertyMap::new());
        registry.register(map);

        assert!(registry.contains::<Point>());
        assert_eq!(registry.get::<Point>().unwrap().len(), 1);
    }

    #[test]
    fn test_register_replaces() {
        let registry = MappingRegistry::new();
        registry.register(ClassMap::<Point>::new());

        let mut map = ClassMap::<Point>::new();
        map.map("x", |p: &mut Point, v| p.x = v, OneToOnePropertyMap::new())
            .map("y", |p: &mut Point, v| p.y = v, OneToOnePropertyMap::new());
        registry.register(map);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get::<Point>().unwrap().len(), 2);
    }

    #[test]
    fn test_get_or_infer_caches() {
        let registry = MappingRegistry::new();
        let first = registry
            .get_or_infer::<Point>(EmptyValueStrategy::ThrowIfPrimitive)
            .unwrap();
        let second = registry
            .get_or_infer::<Point>(EmptyValueStrategy::SetToDefaultValue)
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.strategy(), EmptyValueStrategy::ThrowIfPrimitive);
    }

    #[test]
    fn test_failed_inference_registers_nothing() {
        let registry = MappingRegistry::new();
        let err = registry
            .get_or_infer::<Broken>(EmptyValueStrategy::ThrowIfPrimitive)
            .unwrap_err();

        assert!(matches!(err, MappingError::AutoMappingFailed { .. }));
        assert!(!registry.contains::<Broken>());
    }
}
