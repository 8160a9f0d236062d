//! Well-known primitive target types.
//!
//! A [`CellPrimitive`] is a type one cell converts into directly. Each type
//! names its default mapper, its default value and the fallback strategies it
//! prefers; there is no runtime lookup of defaults.

use chrono::{NaiveDate, NaiveDateTime};
use url::Url;
use uuid::Uuid;

use super::fallback::EmptyValueStrategy;
use super::mappers::{
    BoolMapper, DateMapper, DateTimeMapper, GuidMapper, NullableMapper, ParseMapper,
    StringMapper, UriMapper,
};
use super::CellValueMapper;

use EmptyValueStrategy::{SetToDefaultValue, ThrowIfPrimitive};

/// A type one cell converts into directly.
pub trait CellPrimitive: Clone + Send + Sync + 'static {
    /// Empty cells of nullable types always map to their null value.
    const NULLABLE: bool = false;

    /// Strategies this type prefers for (empty, invalid) cells.
    fn preferred_strategies() -> (EmptyValueStrategy, EmptyValueStrategy) {
        (ThrowIfPrimitive, ThrowIfPrimitive)
    }

    /// The value used by [`EmptyValueStrategy::SetToDefaultValue`], if the type has one.
    fn default_value() -> Option<Self>;

    /// The value of an empty cell for nullable types.
    fn null_value() -> Option<Self> {
        None
    }

    fn default_mapper() -> Box<dyn CellValueMapper<Self>>;
}

/// A fieldless enum that maps from its member names.
///
/// Implemented by [`cell_enum!`](crate::cell_enum), which also makes the enum a
/// [`CellPrimitive`].
pub trait CellEnum: Clone + Send + Sync + 'static {
    const VARIANTS: &'static [(&'static str, Self)];
}

impl CellPrimitive for String {
    fn preferred_strategies() -> (EmptyValueStrategy, EmptyValueStrategy) {
        (SetToDefaultValue, SetToDefaultValue)
    }

    fn default_value() -> Option<Self> {
        Some(String::new())
    }

    fn default_mapper() -> Box<dyn CellValueMapper<Self>> {
        Box::new(StringMapper)
    }
}

impl CellPrimitive for bool {
    fn default_value() -> Option<Self> {
        Some(false)
    }

    fn default_mapper() -> Box<dyn CellValueMapper<Self>> {
        Box::new(BoolMapper)
    }
}

impl CellPrimitive for NaiveDateTime {
    fn default_value() -> Option<Self> {
        NaiveDate::from_ymd_opt(1970, 1, 1).and_then(|date| date.and_hms_opt(0, 0, 0))
    }

    fn default_mapper() -> Box<dyn CellValueMapper<Self>> {
        Box::new(DateTimeMapper::new())
    }
}

impl CellPrimitive for NaiveDate {
    fn default_value() -> Option<Self> {
        NaiveDate::from_ymd_opt(1970, 1, 1)
    }

    fn default_mapper() -> Box<dyn CellValueMapper<Self>> {
        Box::new(DateMapper::new())
    }
}

impl CellPrimitive for Uuid {
    fn default_value() -> Option<Self> {
        Some(Uuid::nil())
    }

    fn default_mapper() -> Box<dyn CellValueMapper<Self>> {
        Box::new(GuidMapper)
    }
}

impl CellPrimitive for Url {
    fn preferred_strategies() -> (EmptyValueStrategy, EmptyValueStrategy) {
        (SetToDefaultValue, ThrowIfPrimitive)
    }

    // No sensible default URL exists; use `Option<Url>` for optional links.
    fn default_value() -> Option<Self> {
        None
    }

    fn default_mapper() -> Box<dyn CellValueMapper<Self>> {
        Box::new(UriMapper)
    }
}

impl<P: CellPrimitive> CellPrimitive for Option<P> {
    const NULLABLE: bool = true;

    fn preferred_strategies() -> (EmptyValueStrategy, EmptyValueStrategy) {
        P::preferred_strategies()
    }

    fn default_value() -> Option<Self> {
        P::default_value().map(Some)
    }

    fn null_value() -> Option<Self> {
        Some(None)
    }

    fn default_mapper() -> Box<dyn CellValueMapper<Self>> {
        Box::new(NullableMapper::new(P::default_mapper()))
    }
}

macro_rules! parse_primitive {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl CellPrimitive for $ty {
                fn default_value() -> Option<Self> {
                    Some(<$ty>::default())
                }

                fn default_mapper() -> Box<dyn CellValueMapper<Self>> {
                    Box::new(ParseMapper::<$ty>::new())
                }
            }
        )+
    };
}

parse_primitive!(char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Make a fieldless enum a cell primitive that maps from its variant names.
///
/// The enum must implement `Clone` and `Default`; the default is used by
/// [`EmptyValueStrategy::SetToDefaultValue`]. Names match case-insensitively
/// unless the pipeline is given a case-sensitive [`EnumMapper`](super::EnumMapper).
///
/// ```
/// use sheetmap::cell_enum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Default)]
/// enum Sector {
///     #[default]
///     Unknown,
///     Government,
///     Ngo,
/// }
///
/// cell_enum!(Sector { Unknown, Government, Ngo });
/// ```
#[macro_export]
macro_rules! cell_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::pipeline::CellEnum for $ty {
            const VARIANTS: &'static [(&'static str, Self)] =
                &[$((stringify!($variant), $ty::$variant)),+];
        }

        impl $crate::pipeline::CellPrimitive for $ty {
            fn default_value() -> ::std::option::Option<Self> {
                ::std::option::Option::Some(<$ty as ::std::default::Default>::default())
            }

            fn default_mapper() -> ::std::boxed::Box<dyn $crate::pipeline::CellValueMapper<Self>> {
                ::std::boxed::Box::new($crate::pipeline::EnumMapper::<$ty>::new())
            }
        }

        impl $crate::mapping::Mappable for $ty {
            fn shape() -> $crate::mapping::Shape<Self> {
                $crate::mapping::Shape::primitive()
            }
        }
    };
}
