//! Dataset, Row, and Value data structures

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ByteSize;
use crate::error::{Error, Result};

use super::schema::Schema;

/// Stands in for cells missing from short rows
static NULL: Value = Value::Null;

/// A typed scalar value
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    String(String),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed("null"),
            Value::Boolean(b) => Cow::Owned(b.to_string()),
            Value::Integer(i) => Cow::Owned(i.to_string()),
            Value::Double(f) => Cow::Owned(f.to_string()),
            Value::Date(d) => Cow::Owned(d.to_string()),
            Value::Timestamp(dt) => Cow::Owned(dt.to_string()),
            Value::String(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Approximate in-memory footprint in bytes
    pub fn estimated_size(&self) -> u64 {
        let inline = std::mem::size_of::<Value>() as u64;
        match self {
            Value::String(s) => inline + s.len() as u64,
            _ => inline,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A row in the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Values in column order
    pub values: Vec<Value>,
    /// Original line number in source file (1-indexed)
    pub source_line: u64,
}

impl Row {
    pub fn new(values: Vec<Value>, source_line: u64) -> Self {
        Self {
            values,
            source_line,
        }
    }

    /// Get a value by column index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Pair each value with its column name
    pub fn to_map<'a>(&'a self, schema: &'a Schema) -> IndexMap<&'a str, &'a Value> {
        schema.names().zip(self.values.iter()).collect()
    }

    /// Approximate in-memory footprint in bytes
    pub fn estimated_size(&self) -> u64 {
        let inline = std::mem::size_of::<Row>() as u64;
        inline + self.values.iter().map(Value::estimated_size).sum::<u64>()
    }
}

/// A loaded, immutable table: schema plus rows
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Row>,
    max_result_size: ByteSize,
}

impl Dataset {
    /// Create a dataset with no result-size limit
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows,
            max_result_size: ByteSize::bytes(0),
        }
    }

    /// Bound the size of rows returned by `head`
    pub fn with_max_result_size(mut self, size: ByteSize) -> Self {
        self.max_result_size = size;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in order
    pub fn columns(&self) -> Vec<&str> {
        self.schema.names().collect()
    }

    /// `(column name, type name)` pairs
    pub fn dtypes(&self) -> Vec<(&str, &'static str)> {
        self.schema
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.data_type.name()))
            .collect()
    }

    /// All rows, without the result-size check
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The first `n` rows
    pub fn head(&self, n: usize) -> Result<&[Row]> {
        let sample = &self.rows[..n.min(self.rows.len())];

        if !self.max_result_size.is_unlimited() {
            let limit = self.max_result_size.as_u64();
            let estimated: u64 = sample.iter().map(Row::estimated_size).sum();
            if estimated > limit {
                return Err(Error::ResultTooLarge { estimated, limit });
            }
        }

        Ok(sample)
    }

    /// The first row, if any
    pub fn first(&self) -> Result<Option<&Row>> {
        Ok(self.head(1)?.first())
    }

    /// Iterate over the values of one column
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.schema.index_of(name)?;
        Some(
            self.rows
                .iter()
                .map(move |row| row.get(idx).unwrap_or(&NULL)),
        )
    }

    /// Approximate in-memory footprint in bytes
    pub fn estimated_size(&self) -> u64 {
        self.rows.iter().map(Row::estimated_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataType, Field};

    fn sample() -> Dataset {
        let schema = Schema::new(vec![
            Field::new("rank", DataType::Integer),
            Field::new("title", DataType::String),
        ]);
        let rows = vec![
            Row::new(vec![Value::Integer(1), "Despacito".into()], 2),
            Row::new(vec![Value::Integer(2), "Shape of You".into()], 3),
            Row::new(vec![Value::Integer(3), Value::Null], 4),
        ];
        Dataset::new(schema, rows)
    }

    #[test]
    fn test_head_and_count() {
        let ds = sample();
        assert_eq!(ds.count(), 3);
        assert_eq!(ds.head(2).unwrap().len(), 2);
        assert_eq!(ds.head(10).unwrap().len(), 3);
        assert_eq!(ds.first().unwrap().unwrap().source_line, 2);
        assert_eq!(ds.dtypes(), vec![("rank", "bigint"), ("title", "string")]);
    }

    #[test]
    fn test_head_respects_max_result_size() {
        let ds = sample().with_max_result_size(ByteSize::bytes(16));
        assert!(matches!(ds.head(2), Err(Error::ResultTooLarge { .. })));
        assert!(ds.head(0).unwrap().is_empty());
    }

    #[test]
    fn test_row_to_map() {
        let ds = sample();
        let row = &ds.rows()[1];
        let map = row.to_map(ds.schema());
        assert_eq!(map.get("rank"), Some(&&Value::Integer(2)));
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["rank", "title"]);
    }

    #[test]
    fn test_column_values() {
        let ds = sample();
        let nulls = ds.column("title").unwrap().filter(|v| v.is_null()).count();
        assert_eq!(nulls, 1);
        assert!(ds.column("streams").is_none());
    }

    #[test]
    fn test_column_reads_short_rows_as_null() {
        let schema = Schema::new(vec![
            Field::new("rank", DataType::Integer),
            Field::new("title", DataType::String),
        ]);
        let ds = Dataset::new(schema, vec![Row::new(vec![Value::Integer(1)], 2)]);
        let titles: Vec<&Value> = ds.column("title").unwrap().collect();
        assert_eq!(titles, vec![&Value::Null]);
    }

    #[test]
    fn test_nan_equality() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Integer(1), Value::Double(1.0));
    }
}
