//! Database value types
//!
//! This module defines the tagged scalar produced for every field and the
//! ordered row that groups them.

use super::error::{DatabaseError, Result};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

/// Database value that can hold different types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatabaseValue {
    /// Null value
    Null,
    /// Integer column value
    Int(i64),
    /// Floating point or decimal column value
    Float(f64),
    /// Anything else, kept as text
    Text(String),
}

impl DatabaseValue {
    /// Get the value as an i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DatabaseValue::Int(v) => Some(*v),
            DatabaseValue::Float(v) => Some(*v as i64),
            DatabaseValue::Text(s) => s.trim().parse().ok(),
            DatabaseValue::Null => None,
        }
    }

    /// Get the value as an f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DatabaseValue::Float(v) => Some(*v),
            DatabaseValue::Int(v) => Some(*v as f64),
            DatabaseValue::Text(s) => s.trim().parse().ok(),
            DatabaseValue::Null => None,
        }
    }

    /// Get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DatabaseValue::Int(v) => Some(*v != 0),
            DatabaseValue::Float(v) => Some(*v != 0.0),
            DatabaseValue::Text(s) => match s.to_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            DatabaseValue::Null => None,
        }
    }

    /// Get the value as a string (zero-copy for Text values)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DatabaseValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the value as a string (with conversion)
    pub fn as_string(&self) -> String {
        match self {
            DatabaseValue::Null => "null".to_string(),
            DatabaseValue::Int(v) => v.to_string(),
            DatabaseValue::Float(v) => v.to_string(),
            DatabaseValue::Text(s) => s.clone(),
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Null or empty text
    pub fn is_empty(&self) -> bool {
        match self {
            DatabaseValue::Null => true,
            DatabaseValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            DatabaseValue::Null => "null",
            DatabaseValue::Int(_) => "int",
            DatabaseValue::Float(_) => "float",
            DatabaseValue::Text(_) => "string",
        }
    }
}

impl std::fmt::Display for DatabaseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseValue::Null => write!(f, "NULL"),
            DatabaseValue::Int(v) => write!(f, "{}", v),
            DatabaseValue::Float(v) => write!(f, "{}", v),
            DatabaseValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(v: bool) -> Self {
        DatabaseValue::Int(v as i64)
    }
}

impl From<i32> for DatabaseValue {
    fn from(v: i32) -> Self {
        DatabaseValue::Int(v as i64)
    }
}

impl From<i64> for DatabaseValue {
    fn from(v: i64) -> Self {
        DatabaseValue::Int(v)
    }
}

impl From<u32> for DatabaseValue {
    fn from(v: u32) -> Self {
        DatabaseValue::Int(v as i64)
    }
}

impl From<f32> for DatabaseValue {
    fn from(v: f32) -> Self {
        DatabaseValue::Float(v as f64)
    }
}

impl From<f64> for DatabaseValue {
    fn from(v: f64) -> Self {
        DatabaseValue::Float(v)
    }
}

impl From<String> for DatabaseValue {
    fn from(v: String) -> Self {
        DatabaseValue::Text(v)
    }
}

impl From<&str> for DatabaseValue {
    fn from(v: &str) -> Self {
        DatabaseValue::Text(v.to_string())
    }
}

impl<T: Into<DatabaseValue>> From<Option<T>> for DatabaseValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// A row of database results
///
/// Keys keep the column order of the result set. Column names are shared by
/// every row of the same result set.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseRow {
    columns: Arc<Vec<String>>,
    values: Vec<DatabaseValue>,
    index: Arc<HashMap<String, usize>>,
}

impl DatabaseRow {
    /// Build a row; `values` must line up with `columns`.
    pub fn new(columns: Arc<Vec<String>>, values: Vec<DatabaseValue>) -> Self {
        let index = Arc::new(Self::build_index(&columns));
        Self::with_index(columns, index, values)
    }

    /// Build a row reusing an existing column index.
    pub(crate) fn with_index(
        columns: Arc<Vec<String>>,
        index: Arc<HashMap<String, usize>>,
        values: Vec<DatabaseValue>,
    ) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self {
            columns,
            values,
            index,
        }
    }

    /// Build an index from column name to position.
    ///
    /// Duplicate names resolve to the last column, like an associative fetch.
    pub(crate) fn build_index(columns: &[String]) -> HashMap<String, usize> {
        columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect()
    }

    /// Get a value by column name
    pub fn get(&self, column: &str) -> Option<&DatabaseValue> {
        self.index.get(column).and_then(|&i| self.values.get(i))
    }

    /// Get a value by column name or fail with `ColumnNotFound`
    pub fn try_get(&self, column: &str) -> Result<&DatabaseValue> {
        self.get(column)
            .ok_or_else(|| DatabaseError::ColumnNotFound(column.to_string()))
    }

    /// Get a value by position
    pub fn get_index(&self, index: usize) -> Option<&DatabaseValue> {
        self.values.get(index)
    }

    /// Replace the value of an existing column; returns the previous value.
    pub fn set(&mut self, column: &str, value: DatabaseValue) -> Option<DatabaseValue> {
        let i = *self.index.get(column)?;
        Some(std::mem::replace(&mut self.values[i], value))
    }

    pub(crate) fn set_index(&mut self, index: usize, value: DatabaseValue) {
        self.values[index] = value;
    }

    /// Column names in result-set order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in column order
    pub fn values(&self) -> &[DatabaseValue] {
        &self.values
    }

    /// Iterate `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DatabaseValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub(crate) fn values_mut(&mut self) -> &mut [DatabaseValue] {
        &mut self.values
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert into a JSON object keyed by column name
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .iter()
            .map(|(k, v)| (k.to_string(), value_to_json(v)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Deserialize the row into a record type
    ///
    /// ```
    /// use rust_sql_wrapper::{DatabaseRow, DatabaseValue};
    /// use serde::Deserialize;
    /// use std::sync::Arc;
    ///
    /// #[derive(Deserialize)]
    /// struct Sample {
    ///     id: i64,
    ///     name: String,
    /// }
    ///
    /// let row = DatabaseRow::new(
    ///     Arc::new(vec!["id".into(), "name".into()]),
    ///     vec![DatabaseValue::Int(7), DatabaseValue::from("Bea")],
    /// );
    /// let sample: Sample = row.into_record().unwrap();
    /// assert_eq!(sample.id, 7);
    /// assert_eq!(sample.name, "Bea");
    /// ```
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

fn value_to_json(value: &DatabaseValue) -> serde_json::Value {
    match value {
        DatabaseValue::Null => serde_json::Value::Null,
        DatabaseValue::Int(v) => serde_json::Value::from(*v),
        // NaN and infinities have no JSON form
        DatabaseValue::Float(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        DatabaseValue::Text(s) => serde_json::Value::String(s.clone()),
    }
}

impl Serialize for DatabaseRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Multiple rows returned from a query
pub type DatabaseResult = Vec<DatabaseRow>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> DatabaseRow {
        DatabaseRow::new(
            Arc::new(vec!["ID".into(), "Name".into(), "Score".into()]),
            vec![
                DatabaseValue::Int(1),
                DatabaseValue::from("Bea"),
                DatabaseValue::Null,
            ],
        )
    }

    #[test]
    fn test_value_conversions() {
        let val = DatabaseValue::Int(42);
        assert_eq!(val.as_i64(), Some(42));
        assert_eq!(val.as_f64(), Some(42.0));
        assert_eq!(val.as_string(), "42");

        let val = DatabaseValue::Text("123".to_string());
        assert_eq!(val.as_i64(), Some(123));

        let val: DatabaseValue = true.into();
        assert_eq!(val.as_bool(), Some(true));

        assert_eq!(DatabaseValue::Null.as_i64(), None);
    }

    #[test]
    fn test_value_from_types() {
        let val: DatabaseValue = Some(42).into();
        assert_eq!(val, DatabaseValue::Int(42));

        let val: DatabaseValue = Option::<i32>::None.into();
        assert_eq!(val, DatabaseValue::Null);

        let val: DatabaseValue = 2.5f64.into();
        assert_eq!(val.type_name(), "float");
    }

    #[test]
    fn test_is_empty() {
        assert!(DatabaseValue::Null.is_empty());
        assert!(DatabaseValue::from("").is_empty());
        assert!(!DatabaseValue::Int(0).is_empty());
        assert!(!DatabaseValue::from("0").is_empty());
    }

    #[test]
    fn test_row_keeps_column_order() {
        let row = sample_row();
        let names: Vec<&str> = row.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["ID", "Name", "Score"]);
        assert_eq!(row.get("Name").and_then(|v| v.as_str()), Some("Bea"));
        assert_eq!(row.get_index(0), Some(&DatabaseValue::Int(1)));
        assert!(row.get("missing").is_none());
        assert!(matches!(
            row.try_get("missing"),
            Err(DatabaseError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_row_set() {
        let mut row = sample_row();
        let old = row.set("Score", DatabaseValue::Float(9.5));
        assert_eq!(old, Some(DatabaseValue::Null));
        assert_eq!(row.get("Score"), Some(&DatabaseValue::Float(9.5)));
        assert_eq!(row.set("nope", DatabaseValue::Null), None);
    }

    #[test]
    fn test_row_serializes_in_order() {
        let json = serde_json::to_string(&sample_row()).unwrap();
        assert_eq!(json, r#"{"ID":1,"Name":"Bea","Score":null}"#);
    }

    #[test]
    fn test_row_into_record() {
        #[derive(Deserialize)]
        struct Sample {
            #[serde(rename = "ID")]
            id: i64,
            #[serde(rename = "Name")]
            name: String,
            #[serde(rename = "Score")]
            score: Option<f64>,
        }

        let record: Sample = sample_row().into_record().unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.name, "Bea");
        assert_eq!(record.score, None);
    }
}
