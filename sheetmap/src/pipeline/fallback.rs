//! Fallback items and their reconciliation from an empty value strategy.

use std::any::type_name;

use log::trace;
use serde::{Deserialize, Serialize};

use super::primitive::CellPrimitive;
use crate::cell::ReadCell;
use crate::error::{MapResult, MappingError};

/// What a class map does with empty (and invalid) cells of members that
/// have no explicit fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyValueStrategy {
    /// Fail the row unless the target type prefers a default.
    #[default]
    ThrowIfPrimitive,
    /// Use the target type's default value.
    SetToDefaultValue,
}

/// The value (or failure) used when a cell is empty or cannot be converted.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackItem<T> {
    FixedValue(T),
    Throw,
}

impl<T: Clone> FallbackItem<T> {
    /// Resolve the fallback for one cell. Evaluated per cell, never cached.
    pub fn perform(&self, cell: &ReadCell) -> MapResult<T> {
        match self {
            FallbackItem::FixedValue(value) => {
                trace!("row {}: fallback value used for {}", cell.row, type_name::<T>());
                Ok(value.clone())
            }
            FallbackItem::Throw => Err(conversion_invalid::<T>(cell)),
        }
    }
}

/// The error raised when a cell resolves to no value of `T`.
pub fn conversion_invalid<T>(cell: &ReadCell) -> MappingError {
    MappingError::ConversionInvalid {
        row: cell.row,
        column: cell.column,
        value: cell.text(),
        target: type_name::<T>(),
    }
}

/// Derive the fallback of a primitive for empty (`is_empty`) or invalid cells.
///
/// Empty cells of nullable types always become `None`. Otherwise the default
/// value is used when either the type prefers it or the class strategy asks
/// for it, and the item throws when the type has no default.
pub fn reconcile<P: CellPrimitive>(
    strategy: EmptyValueStrategy,
    is_empty: bool,
) -> FallbackItem<P> {
    if is_empty && P::NULLABLE {
        return match P::null_value() {
            Some(value) => FallbackItem::FixedValue(value),
            None => FallbackItem::Throw,
        };
    }

    let (empty_preference, invalid_preference) = P::preferred_strategies();
    let preferred = if is_empty {
        empty_preference
    } else {
        invalid_preference
    };

    if preferred == EmptyValueStrategy::SetToDefaultValue
        || strategy == EmptyValueStrategy::SetToDefaultValue
    {
        match P::default_value() {
            Some(value) => FallbackItem::FixedValue(value),
            None => FallbackItem::Throw,
        }
    } else {
        FallbackItem::Throw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;
    use url::Url;

    #[test]
    fn test_throw_reports_cell() {
        let cell = ReadCell::new(3, Some(1), CellValue::text("abc"));
        let err = FallbackItem::<i32>::Throw.perform(&cell).unwrap_err();
        match err {
            MappingError::ConversionInvalid { row, column, value, target } => {
                assert_eq!(row, 3);
                assert_eq!(column, Some(1));
                assert_eq!(value, "abc");
                assert_eq!(target, "i32");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fixed_value() {
        let cell = ReadCell::new(0, None, CellValue::Empty);
        assert_eq!(FallbackItem::FixedValue(7).perform(&cell).unwrap(), 7);
    }

    #[test]
    fn test_reconcile_throw_if_primitive() {
        let strategy = EmptyValueStrategy::ThrowIfPrimitive;
        assert_eq!(reconcile::<i32>(strategy, true), FallbackItem::Throw);
        assert_eq!(reconcile::<bool>(strategy, false), FallbackItem::Throw);
        // Strings prefer their default for both slots.
        assert_eq!(reconcile::<String>(strategy, true), FallbackItem::FixedValue(String::new()));
        assert_eq!(reconcile::<String>(strategy, false), FallbackItem::FixedValue(String::new()));
    }

    #[test]
    fn test_reconcile_set_to_default() {
        let strategy = EmptyValueStrategy::SetToDefaultValue;
        assert_eq!(reconcile::<i32>(strategy, true), FallbackItem::FixedValue(0));
        assert_eq!(reconcile::<bool>(strategy, false), FallbackItem::FixedValue(false));
    }

    #[test]
    fn test_reconcile_nullable() {
        let strategies = [
            EmptyValueStrategy::ThrowIfPrimitive,
            EmptyValueStrategy::SetToDefaultValue,
        ];
        for strategy in strategies {
            assert_eq!(reconcile::<Option<i32>>(strategy, true), FallbackItem::FixedValue(None));
        }
        assert_eq!(
            reconcile::<Option<i32>>(EmptyValueStrategy::ThrowIfPrimitive, false),
            FallbackItem::Throw
        );
        assert_eq!(
            reconcile::<Option<i32>>(EmptyValueStrategy::SetToDefaultValue, false),
            FallbackItem::FixedValue(Some(0))
        );
    }

    #[test]
    fn test_reconcile_url_has_no_default() {
        let throw = FallbackItem::Throw;
        assert_eq!(reconcile::<Url>(EmptyValueStrategy::ThrowIfPrimitive, true), throw);
        assert_eq!(reconcile::<Url>(EmptyValueStrategy::SetToDefaultValue, false), throw);
    }

    #[test]
    fn test_strategy_serde() {
        let s: EmptyValueStrategy = serde_json::from_str("\"set_to_default_value\"").unwrap();
        assert_eq!(s, EmptyValueStrategy::SetToDefaultValue);
    }
}
