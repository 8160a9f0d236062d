//! Cell value mappers for the well-known target types.
//!
//! Every mapper except [`StringMapper`] ignores leading and trailing
//! whitespace of the cell text.

use std::any::type_name;
use std::marker::PhantomData;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use url::Url;
use uuid::Uuid;

use super::primitive::CellEnum;
use super::{CellMapResult, CellValueMapper};
use crate::cell::{CellValue, ReadCell};

/// Formats tried before any additional format.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d",
    "%d/%m/%Y",
];

/// Maps any cell to its text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringMapper;

impl CellValueMapper<String> for StringMapper {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<String> {
        CellMapResult::Success(cell.text())
    }
}

/// Maps `true`/`false` (any case), `1`/`0`, and boolean or numeric cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolMapper;

impl CellValueMapper<bool> for BoolMapper {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<bool> {
        match &cell.value {
            CellValue::Bool(b) => CellMapResult::Success(*b),
            CellValue::Int(1) => CellMapResult::Success(true),
            CellValue::Int(0) => CellMapResult::Success(false),
            CellValue::Float(f) if *f == 1.0 => CellMapResult::Success(true),
            CellValue::Float(f) if *f == 0.0 => CellMapResult::Success(false),
            _ => match cell.text().trim().to_lowercase().as_str() {
                "true" | "1" => CellMapResult::Success(true),
                "false" | "0" => CellMapResult::Success(false),
                _ => CellMapResult::Invalid,
            },
        }
    }
}

/// Parses date-times: typed date cells first, then the default formats,
/// then each additional format in the order given. Date-only formats give midnight.
#[derive(Debug, Clone, Default)]
pub struct DateTimeMapper {
    formats: Vec<String>,
}

impl DateTimeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }
}

impl CellValueMapper<NaiveDateTime> for DateTimeMapper {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<NaiveDateTime> {
        if let CellValue::DateTime(dt) = &cell.value {
            return CellMapResult::Success(*dt);
        }
        parse_datetime(cell.text().trim(), &self.formats).into()
    }

    fn add_formats(&mut self, formats: &[String]) -> bool {
        self.formats.extend_from_slice(formats);
        true
    }
}

/// Like [`DateTimeMapper`] but keeps only the date.
#[derive(Debug, Clone, Default)]
pub struct DateMapper {
    inner: DateTimeMapper,
}

impl DateMapper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CellValueMapper<NaiveDate> for DateMapper {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<NaiveDate> {
        match self.inner.map_cell_value(cell) {
            CellMapResult::Success(dt) => CellMapResult::Success(dt.date()),
            CellMapResult::Invalid => CellMapResult::Invalid,
        }
    }

    fn add_formats(&mut self, formats: &[String]) -> bool {
        self.inner.add_formats(formats)
    }
}

fn parse_datetime(text: &str, additional: &[String]) -> Option<NaiveDateTime> {
    DEFAULT_DATE_FORMATS
        .iter()
        .copied()
        .chain(additional.iter().map(String::as_str))
        .find_map(|format| parse_with_format(text, format))
}

fn parse_with_format(text: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, format).ok().or_else(|| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

/// Parses GUIDs in any of the usual textual forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidMapper;

impl CellValueMapper<Uuid> for GuidMapper {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<Uuid> {
        Uuid::parse_str(cell.text().trim()).ok().into()
    }
}

/// Parses absolute URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriMapper;

impl CellValueMapper<Url> for UriMapper {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<Url> {
        Url::parse(cell.text().trim()).ok().into()
    }
}

/// Maps variant names of a [`CellEnum`].
#[derive(Debug, Clone, Copy)]
pub struct EnumMapper<E> {
    case_sensitive: bool,
    _marker: PhantomData<fn() -> E>,
}

impl<E: CellEnum> EnumMapper<E> {
    /// A case-insensitive enum mapper.
    pub fn new() -> Self {
        Self {
            case_sensitive: false,
            _marker: PhantomData,
        }
    }

    pub fn case_sensitive() -> Self {
        Self {
            case_sensitive: true,
            _marker: PhantomData,
        }
    }
}

impl<E: CellEnum> Default for EnumMapper<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CellEnum> CellValueMapper<E> for EnumMapper<E> {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<E> {
        let text = cell.text();
        let text = text.trim();
        E::VARIANTS
            .iter()
            .find(|(name, _)| {
                if self.case_sensitive {
                    *name == text
                } else {
                    name.eq_ignore_ascii_case(text)
                }
            })
            .map(|(_, value)| value.clone())
            .into()
    }
}

/// Maps through [`FromStr`]; the generic path for numbers and other parseable types.
#[derive(Debug, Clone, Copy)]
pub struct ParseMapper<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ParseMapper<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ParseMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromStr> CellValueMapper<T> for ParseMapper<T> {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<T> {
        let text = cell.text();
        match text.trim().parse::<T>() {
            Ok(value) => CellMapResult::Success(value),
            Err(_) => {
                log::trace!("row {}: '{}' is not a {}", cell.row, text, type_name::<T>());
                CellMapResult::Invalid
            }
        }
    }
}

/// A caller-supplied alias table from raw text to value.
#[derive(Debug, Clone)]
pub struct MappingTableMapper<T> {
    entries: Vec<(String, T)>,
    case_sensitive: bool,
}

impl<T> MappingTableMapper<T> {
    /// A case-insensitive table.
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }
}

impl<T: Clone + Send + Sync> CellValueMapper<T> for MappingTableMapper<T> {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<T> {
        let text = cell.text();
        let text = text.trim();
        self.entries
            .iter()
            .find(|(key, _)| {
                if self.case_sensitive {
                    *key == text
                } else {
                    key.to_lowercase() == text.to_lowercase()
                }
            })
            .map(|(_, value)| value.clone())
            .into()
    }
}

/// Lifts a mapper of `P` into a mapper of `Option<P>`.
pub struct NullableMapper<P> {
    inner: Box<dyn CellValueMapper<P>>,
}

impl<P> NullableMapper<P> {
    pub fn new(inner: Box<dyn CellValueMapper<P>>) -> Self {
        Self { inner }
    }
}

impl<P> CellValueMapper<Option<P>> for NullableMapper<P> {
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<Option<P>> {
        match self.inner.map_cell_value(cell) {
            CellMapResult::Success(value) => CellMapResult::Success(Some(value)),
            CellMapResult::Invalid => CellMapResult::Invalid,
        }
    }

    fn add_formats(&mut self, formats: &[String]) -> bool {
        self.inner.add_formats(formats)
    }
}

/// Adapts a closure into a mapper.
pub struct FnMapper<F>(pub F);

impl<T, F> CellValueMapper<T> for FnMapper<F>
where
    F: Fn(&ReadCell) -> CellMapResult<T> + Send + Sync,
{
    fn map_cell_value(&self, cell: &ReadCell) -> CellMapResult<T> {
        (self.0)(cell)
    }
}
