//! Row mapping traits and utilities

use crate::error::{SpectromError, SpectromResult};
use crate::value::Value;

/// A database row: an ordered column → [`Value`] map.
///
/// Row construction is a direct field copy of what the handle returned;
/// there is no hydration beyond the raw values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, replacing any existing value for that column.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        if let Some(slot) = self.columns.iter_mut().find(|(name, _)| *name == column) {
            slot.1 = value;
        } else {
            self.columns.push((column, value));
        }
    }

    /// Get a column value by name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Get a column value converted to `T`, returning a decode error on
    /// a missing column or failed conversion.
    pub fn try_get<T: FromValue>(&self, column: &str) -> SpectromResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| SpectromError::decode(column, "column not present in row"))?;
        T::from_value(value).map_err(|message| SpectromError::decode(column, message))
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over (column, value) pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

/// Trait for mapping rows onto plain structs
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> SpectromResult<Self>;
}

/// Scalar conversion out of a [`Value`].
pub trait FromValue: Sized {
    /// Convert a value into Self, or describe why it cannot be converted.
    fn from_value(value: &Value) -> Result<Self, String>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::UInt(v) => i64::try_from(*v).map_err(|_| format!("{v} overflows i64")),
            Value::Text(s) => s.parse().map_err(|_| format!("'{s}' is not an integer")),
            other => Err(format!("cannot convert {other:?} to i64")),
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::UInt(v) => Ok(*v),
            Value::Int(v) => u64::try_from(*v).map_err(|_| format!("{v} is negative")),
            Value::Text(s) => s.parse().map_err(|_| format!("'{s}' is not an integer")),
            other => Err(format!("cannot convert {other:?} to u64")),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::UInt(v) => Ok(*v as f64),
            Value::Text(s) => s.parse().map_err(|_| format!("'{s}' is not a number")),
            other => Err(format!("cannot convert {other:?} to f64")),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            Value::UInt(v) => Ok(*v != 0),
            other => Err(format!("cannot convert {other:?} to bool")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Int(v) => Ok(v.to_string()),
            Value::UInt(v) => Ok(v.to_string()),
            Value::Float(v) => Ok(v.to_string()),
            other => Err(format!("cannot convert {other:?} to String")),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
