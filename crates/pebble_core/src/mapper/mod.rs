//! Aggregate <-> flat field mapping.
//!
//! # Responsibility
//! - Flatten each aggregate into the stable key/value storage schema.
//! - Inflate stored fields back into aggregates from already-resolved
//!   references.
//!
//! # Invariants
//! - `_id` is emitted only for persisted aggregates.
//! - Cross-aggregate links are bare ids; mappers never perform lookups.
//! - Mappers are stateless free functions.

pub mod category;
pub mod collection;
pub mod habit;
pub mod instance;

use crate::model::recurrence::RecurrenceError;
use crate::model::values::{Color, ColorError, Id};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Flat key/value record exchanged with the backing store.
pub type Fields = Map<String, Value>;

/// Key holding the store-assigned id.
pub const ID_KEY: &str = "_id";

pub type MapperResult<T> = Result<T, MapperError>;

/// Errors raised while inflating stored fields.
#[derive(Debug)]
pub enum MapperError {
    MissingField(&'static str),
    InvalidField { key: &'static str, message: String },
    Recurrence(RecurrenceError),
    Color(ColorError),
}

impl Display for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(key) => write!(f, "missing field `{key}`"),
            Self::InvalidField { key, message } => {
                write!(f, "invalid field `{key}`: {message}")
            }
            Self::Recurrence(err) => write!(f, "{err}"),
            Self::Color(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MapperError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingField(_) => None,
            Self::InvalidField { .. } => None,
            Self::Recurrence(err) => Some(err),
            Self::Color(err) => Some(err),
        }
    }
}

impl From<RecurrenceError> for MapperError {
    fn from(value: RecurrenceError) -> Self {
        Self::Recurrence(value)
    }
}

impl From<ColorError> for MapperError {
    fn from(value: ColorError) -> Self {
        Self::Color(value)
    }
}

/// Reads the `_id` of a stored record, if any.
pub fn id_of(fields: &Fields) -> MapperResult<Option<Id>> {
    Ok(optional_str(fields, ID_KEY)?.map(Id::from))
}

pub(crate) fn insert_id(fields: &mut Fields, id: Option<&Id>) {
    if let Some(id) = id {
        fields.insert(ID_KEY.to_string(), Value::from(id.as_str()));
    }
}

pub(crate) fn optional_value<T>(value: Option<T>) -> Value
where
    T: Into<Value>,
{
    value.map_or(Value::Null, Into::into)
}

pub(crate) fn required_str<'a>(fields: &'a Fields, key: &'static str) -> MapperResult<&'a str> {
    optional_str(fields, key)?.ok_or(MapperError::MissingField(key))
}

/// Absent and `null` both read as `None`.
pub(crate) fn optional_str<'a>(
    fields: &'a Fields,
    key: &'static str,
) -> MapperResult<Option<&'a str>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(other) => Err(invalid_type(key, "string", other)),
    }
}

pub(crate) fn optional_color(fields: &Fields, key: &'static str) -> MapperResult<Option<Color>> {
    optional_str(fields, key)?
        .map(Color::new)
        .transpose()
        .map_err(MapperError::from)
}

/// Reads a list of strings; absent or `null` reads as empty.
pub(crate) fn string_list<'a>(fields: &'a Fields, key: &'static str) -> MapperResult<Vec<&'a str>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| invalid_type(key, "list of strings", item))
            })
            .collect(),
        Some(other) => Err(invalid_type(key, "list", other)),
    }
}

pub(crate) fn id_list(fields: &Fields, key: &'static str) -> MapperResult<Vec<Id>> {
    Ok(string_list(fields, key)?.into_iter().map(Id::from).collect())
}

fn invalid_type(key: &'static str, expected: &str, actual: &Value) -> MapperError {
    MapperError::InvalidField {
        key,
        message: format!("expected {expected}, got `{actual}`"),
    }
}
