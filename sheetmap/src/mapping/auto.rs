//! Auto-mapping: infer a class map from the shape of each member.
//!
//! Every member type declares one [`Shape`] through [`Mappable`]:
//!
//! 1. primitive: one cell through the type's default pipeline,
//! 2. dictionary: all columns into a map of primitive values,
//! 3. collection: a comma split of the member's column into primitive elements,
//! 4. object: a nested auto-mapped type.
//!
//! Inference is all-or-nothing. One member that cannot be mapped (say a
//! collection of collections) fails the whole type, so members are never
//! silently skipped.

use std::any::type_name;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::class_map::ClassMap;
use super::dictionary::ManyToOneDictionaryPropertyMap;
use super::enumerable::ManyToOneEnumerablePropertyMap;
use super::object::ManyToOneObjectPropertyMap;
use super::property::{OneToOnePropertyMap, PropertyMap};
use crate::error::{MapResult, MappingError};
use crate::pipeline::{CellPrimitive, EmptyValueStrategy, ValuePipeline};

/// Builds the property map of a member from its name and the class strategy.
pub type BuildProperty<M> = fn(&str, EmptyValueStrategy) -> Result<Box<dyn PropertyMap<M>>, String>;

/// How a member type is read from a row.
pub enum Shape<M> {
    Primitive {
        pipeline: fn(EmptyValueStrategy) -> ValuePipeline<M>,
        property: BuildProperty<M>,
    },
    Dictionary(BuildProperty<M>),
    Collection(BuildProperty<M>),
    Object(BuildProperty<M>),
}

impl<M> Shape<M> {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Primitive { .. } => "primitive",
            Shape::Dictionary(_) => "dictionary",
            Shape::Collection(_) => "collection",
            Shape::Object(_) => "object",
        }
    }

    fn property(&self) -> BuildProperty<M> {
        match self {
            Shape::Primitive { property, .. } => *property,
            Shape::Dictionary(build) | Shape::Collection(build) | Shape::Object(build) => *build,
        }
    }
}

impl<M: CellPrimitive> Shape<M> {
    pub fn primitive() -> Self {
        Shape::Primitive {
            pipeline: ValuePipeline::<M>::for_strategy,
            property: build_primitive::<M>,
        }
    }
}

impl<M: AutoMap> Shape<M> {
    pub fn object() -> Self {
        Shape::Object(build_object::<M>)
    }
}

impl<C> Shape<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// A collection of `E` built through `FromIterator`.
    pub fn collection<E>() -> Self
    where
        E: Mappable + Clone,
        C: FromIterator<E>,
    {
        Shape::Collection(build_collection::<E, C>)
    }

    /// A string-keyed map of `V` built through `FromIterator`.
    pub fn dictionary<V>() -> Self
    where
        V: Mappable + Clone,
        C: FromIterator<(String, V)>,
    {
        Shape::Dictionary(build_dictionary::<V, C>)
    }
}

/// A type that can be the type of an auto-mapped member.
pub trait Mappable: Sized + Send + Sync + 'static {
    fn shape() -> Shape<Self>;
}

/// A type whose class map can be inferred.
///
/// `describe` lists the writable members with their setters; the
/// [`auto_map!`](crate::auto_map) macro writes it for plain structs.
pub trait AutoMap: Default + Send + Sync + 'static {
    fn describe(members: &mut Members<Self>);
}

/// Collects inferred members of `T`, remembering the first failure.
pub struct Members<T> {
    strategy: EmptyValueStrategy,
    map: ClassMap<T>,
    error: Option<MappingError>,
}

impl<T> Members<T> {
    fn new(strategy: EmptyValueStrategy) -> Self {
        Self {
            strategy,
            map: ClassMap::with_strategy(strategy),
            error: None,
        }
    }

    /// Infer the property map of one member from the shape of `M`.
    pub fn member<M, F>(&mut self, name: &str, setter: F) -> &mut Self
    where
        M: Mappable,
        F: Fn(&mut T, M) + Send + Sync + 'static,
    {
        if self.error.is_some() {
            return self;
        }

        let build = M::shape().property();
        match build(name, self.strategy) {
            Ok(property) => {
                self.map.map_boxed(name, setter, property);
            }
            Err(reason) => {
                warn!("cannot auto-map {}::{}: {}", type_name::<T>(), name, reason);
                self.error = Some(MappingError::AutoMappingFailed {
                    type_name: type_name::<T>(),
                    member: name.to_string(),
                    reason,
                });
            }
        }
        self
    }

    fn finish(self) -> MapResult<ClassMap<T>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.map),
        }
    }
}

/// Infer the class map of `T`. Fails without a partial map if any member fails.
pub fn create_class_map<T: AutoMap>(strategy: EmptyValueStrategy) -> MapResult<ClassMap<T>> {
    let mut members = Members::new(strategy);
    T::describe(&mut members);
    let map = members.finish()?;
    debug!("inferred class map for {} ({} members)", type_name::<T>(), map.len());
    Ok(map)
}

fn build_primitive<M: CellPrimitive>(
    _member: &str,
    strategy: EmptyValueStrategy,
) -> Result<Box<dyn PropertyMap<M>>, String> {
    Ok(Box::new(OneToOnePropertyMap::with_pipeline(
        ValuePipeline::<M>::for_strategy(strategy),
    )))
}

fn build_object<M: AutoMap>(
    _member: &str,
    strategy: EmptyValueStrategy,
) -> Result<Box<dyn PropertyMap<M>>, String> {
    let map = create_class_map::<M>(strategy).map_err(|err| err.to_string())?;
    Ok(Box::new(ManyToOneObjectPropertyMap::new(map)))
}

fn build_collection<E, C>(
    _member: &str,
    strategy: EmptyValueStrategy,
) -> Result<Box<dyn PropertyMap<C>>, String>
where
    E: Mappable + Clone,
    C: FromIterator<E> + Clone + Send + Sync + 'static,
{
    match E::shape() {
        Shape::Primitive { pipeline, .. } => Ok(Box::new(
            ManyToOneEnumerablePropertyMap::<E, C>::with_pipeline(pipeline(strategy)),
        )),
        other => Err(format!(
            "element type {} is a {}, not a primitive",
            type_name::<E>(),
            other.name()
        )),
    }
}

fn build_dictionary<V, D>(
    _member: &str,
    strategy: EmptyValueStrategy,
) -> Result<Box<dyn PropertyMap<D>>, String>
where
    V: Mappable + Clone,
    D: FromIterator<(String, V)> + Send + Sync + 'static,
{
    match V::shape() {
        Shape::Primitive { pipeline, .. } => Ok(Box::new(
            ManyToOneDictionaryPropertyMap::<V, D>::with_pipeline(pipeline(strategy)),
        )),
        other => Err(format!(
            "value type {} is a {}, not a primitive",
            type_name::<V>(),
            other.name()
        )),
    }
}

macro_rules! primitive_shape {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Mappable for $ty {
                fn shape() -> Shape<Self> {
                    Shape::primitive()
                }
            }
        )+
    };
}

primitive_shape!(
    String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    NaiveDateTime, NaiveDate, Uuid, Url,
);

impl<P: CellPrimitive> Mappable for Option<P> {
    fn shape() -> Shape<Self> {
        Shape::primitive()
    }
}

impl<E: Mappable + Clone> Mappable for Vec<E> {
    fn shape() -> Shape<Self> {
        Shape::collection::<E>()
    }
}

impl<E: Mappable + Clone> Mappable for VecDeque<E> {
    fn shape() -> Shape<Self> {
        Shape::collection::<E>()
    }
}

impl<E: Mappable + Clone> Mappable for LinkedList<E> {
    fn shape() -> Shape<Self> {
        Shape::collection::<E>()
    }
}

impl<E: Mappable + Clone> Mappable for Box<[E]> {
    fn shape() -> Shape<Self> {
        Shape::collection::<E>()
    }
}

impl<E: Mappable + Clone + Eq + Hash> Mappable for HashSet<E> {
    fn shape() -> Shape<Self> {
        Shape::collection::<E>()
    }
}

impl<E: Mappable + Clone + Ord> Mappable for BTreeSet<E> {
    fn shape() -> Shape<Self> {
        Shape::collection::<E>()
    }
}

impl<V: Mappable + Clone> Mappable for HashMap<String, V> {
    fn shape() -> Shape<Self> {
        Shape::dictionary::<V>()
    }
}

impl<V: Mappable + Clone> Mappable for BTreeMap<String, V> {
    fn shape() -> Shape<Self> {
        Shape::dictionary::<V>()
    }
}

/// Implement [`AutoMap`] and [`Mappable`] for a struct with `Default`,
/// mapping each listed field from the column of the same name.
///
/// ```
/// use sheetmap::auto_map;
///
/// #[derive(Debug, Default)]
/// struct Product {
///     sku: String,
///     price: f64,
///     tags: Vec<String>,
/// }
///
/// auto_map!(Product { sku, price, tags });
/// ```
#[macro_export]
macro_rules! auto_map {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::mapping::AutoMap for $ty {
            fn describe(members: &mut $crate::mapping::Members<Self>) {
                $(
                    members.member(stringify!($field), |target: &mut $ty, value| {
                        target.$field = value
                    });
                )*
            }
        }

        impl $crate::mapping::Mappable for $ty {
            fn shape() -> $crate::mapping::Shape<Self> {
                $crate::mapping::Shape::object()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MemoryGrid;
    use crate::importer::ImporterConfiguration;
    use crate::mapping::PropertyMapKind;
    use crate::sheet::ExcelSheet;

    #[derive(Debug, Default, PartialEq)]
    struct Dimensions {
        width: u32,
        height: u32,
    }
    crate::auto_map!(Dimensions { width, height });

    #[derive(Debug, Default, PartialEq)]
    struct Product {
        sku: String,
        price: Option<f64>,
        tags: Vec<String>,
        size: Dimensions,
        extra: BTreeMap<String, Option<String>>,
    }
    crate::auto_map!(Product { sku, price, tags, size, extra });

    #[derive(Debug, Default)]
    struct Nested {
        name: String,
        matrix: Vec<Vec<i32>>,
    }
    crate::auto_map!(Nested { name, matrix });

    #[derive(Debug, Default)]
    struct Holder {
        inner: Nested,
    }
    crate::auto_map!(Holder { inner });

    #[test]
    fn test_classifies_members() {
        let map = create_class_map::<Product>(EmptyValueStrategy::ThrowIfPrimitive).unwrap();
        let kinds: Vec<_> = map.members().collect();
        assert_eq!(
            kinds,
            vec![
                ("sku", PropertyMapKind::OneToOne),
                ("price", PropertyMapKind::OneToOne),
                ("tags", PropertyMapKind::ManyToOneEnumerable),
                ("size", PropertyMapKind::ManyToOneObject),
                ("extra", PropertyMapKind::ManyToOneDictionary),
            ]
        );
    }

    #[test]
    fn test_inferred_map_reads_row() {
        let grid = MemoryGrid::from_text(
            "Products",
            vec![
                vec!["sku", "price", "tags", "width", "height"],
                vec!["P-1", "", "red,blue", "3", "4"],
            ],
        );
        let config = ImporterConfiguration::default();
        let mut sheet = ExcelSheet::new(&grid, &config, 0);
        sheet.read_heading().unwrap();

        let map = create_class_map::<Product>(EmptyValueStrategy::ThrowIfPrimitive).unwrap();
        let product = map.read_row(&sheet, 1).unwrap();

        assert_eq!(product.sku, "P-1");
        assert_eq!(product.price, None);
        assert_eq!(product.tags, vec!["red", "blue"]);
        assert_eq!(product.size, Dimensions { width: 3, height: 4 });
        assert_eq!(product.extra.len(), 5);
        assert_eq!(product.extra["width"], Some("3".to_string()));
        assert_eq!(product.extra["price"], None);
    }

    #[test]
    fn test_unsupported_member_fails_whole_type() {
        let err = create_class_map::<Nested>(EmptyValueStrategy::ThrowIfPrimitive).unwrap_err();
        match err {
            MappingError::AutoMappingFailed { type_name, member, .. } => {
                assert!(type_name.ends_with("Nested"));
                assert_eq!(member, "matrix");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_failure_fails_parent() {
        let err = create_class_map::<Holder>(EmptyValueStrategy::SetToDefaultValue).unwrap_err();
        assert!(matches!(
            err,
            MappingError::AutoMappingFailed { ref member, ref reason, .. }
                if member == "inner" && reason.contains("matrix")
        ));
    }

    #[test]
    fn test_dictionary_of_collections_is_rejected() {
        match <HashMap<String, Vec<i32>> as Mappable>::shape() {
            Shape::Dictionary(build) => {
                let err = build("values", EmptyValueStrategy::ThrowIfPrimitive).err().unwrap();
                assert!(err.contains("collection"));
            }
            other => panic!("unexpected shape {}", other.name()),
        }
    }
}
