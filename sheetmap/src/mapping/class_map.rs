//! Class maps: every property binding of one target type.

use std::any::type_name;
use std::fmt;

use log::{debug, trace};

use super::property::{PropertyMap, PropertyMapKind};
use crate::error::MapResult;
use crate::pipeline::EmptyValueStrategy;
use crate::sheet::ExcelSheet;

type Apply<T> = Box<dyn Fn(&mut T, &ExcelSheet<'_>, usize) -> MapResult<()> + Send + Sync>;

struct Binding<T> {
    member: String,
    kind: PropertyMapKind,
    apply: Apply<T>,
}

/// The ordered property bindings of `T` plus its empty value strategy.
///
/// Built once (explicitly or by auto-mapping) and reused for every row.
pub struct ClassMap<T> {
    strategy: EmptyValueStrategy,
    bindings: Vec<Binding<T>>,
}

impl<T> ClassMap<T> {
    /// A class map that throws on empty or invalid primitives.
    pub fn new() -> Self {
        Self::with_strategy(EmptyValueStrategy::ThrowIfPrimitive)
    }

    pub fn with_strategy(strategy: EmptyValueStrategy) -> Self {
        Self {
            strategy,
            bindings: Vec::new(),
        }
    }

    pub fn strategy(&self) -> EmptyValueStrategy {
        self.strategy
    }

    /// Bind `property` to `member`, assigning its value through `setter`.
    ///
    /// The property receives its default reader (derived from `member`) and
    /// the fallbacks implied by this map's strategy unless it has its own.
    pub fn map<M, P, F>(&mut self, member: &str, setter: F, property: P) -> &mut Self
    where
        M: 'static,
        P: PropertyMap<M> + 'static,
        F: Fn(&mut T, M) + Send + Sync + 'static,
    {
        self.map_boxed(member, setter, Box::new(property))
    }

    pub fn map_boxed<M, F>(
        &mut self,
        member: &str,
        setter: F,
        mut property: Box<dyn PropertyMap<M>>,
    ) -> &mut Self
    where
        M: 'static,
        F: Fn(&mut T, M) + Send + Sync + 'static,
    {
        property.bind(member, self.strategy);
        let kind = property.kind();
        debug!("{}: bound member '{}' ({})", type_name::<T>(), member, kind);

        self.bindings.push(Binding {
            member: member.to_string(),
            kind,
            apply: Box::new(move |target: &mut T, sheet: &ExcelSheet<'_>, row: usize| {
                let value = property.read(sheet, row)?;
                setter(target, value);
                Ok(())
            }),
        });
        self
    }

    /// Member names and property kinds, in binding order.
    pub fn members(&self) -> impl Iterator<Item = (&str, PropertyMapKind)> {
        self.bindings.iter().map(|b| (b.member.as_str(), b.kind))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<T: Default> ClassMap<T> {
    /// Build a fresh `T` from one row. Any failing member fails the whole row.
    pub fn read_row(&self, sheet: &ExcelSheet<'_>, row: usize) -> MapResult<T> {
        let mut value = T::default();
        for binding in &self.bindings {
            trace!("row {}: reading member '{}'", row, binding.member);
            (binding.apply)(&mut value, sheet, row)?;
        }
        Ok(value)
    }
}

impl<T> Default for ClassMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ClassMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMap")
            .field("type", &type_name::<T>())
            .field("strategy", &self.strategy)
            .field("members", &self.members().collect::<Vec<_>>())
            .finish()
    }
}
