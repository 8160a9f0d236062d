//! Class maps and property maps.
//!
//! A [`ClassMap`] holds one binding per member of a target type. Each binding
//! owns a [`PropertyMap`] that produces the member value from a row:
//!
//! ```text
//! row ──► OneToOnePropertyMap ─────────────► one cell, one value
//!     ──► ManyToOneEnumerablePropertyMap ──► cells or split cell, one collection
//!     ──► ManyToOneDictionaryPropertyMap ──► keyed cells, one map
//!     ──► ManyToOneObjectPropertyMap ──────► nested class map, same row
//! ```
//!
//! Class maps are written by hand through [`ClassMap::map`] or inferred by
//! [`create_class_map`] for types implementing [`AutoMap`].

mod auto;
mod class_map;
mod dictionary;
mod enumerable;
mod object;
mod property;

pub use auto::{create_class_map, AutoMap, BuildProperty, Mappable, Members, Shape};
pub use class_map::ClassMap;
pub use dictionary::{DictionaryFactory, ManyToOneDictionaryPropertyMap};
pub use enumerable::{CollectionFactory, ManyToOneEnumerablePropertyMap};
pub use object::ManyToOneObjectPropertyMap;
pub use property::{OneToOnePropertyMap, PropertyMap, PropertyMapKind};
