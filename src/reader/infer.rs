//! Per-cell type inference and conversion

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::ReadOptions;
use crate::model::{DataType, Value};

const ISO_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Interprets raw cell text according to the read options
pub(crate) struct CellParser<'a> {
    options: &'a ReadOptions,
}

impl<'a> CellParser<'a> {
    pub(crate) fn new(options: &'a ReadOptions) -> Self {
        Self { options }
    }

    pub(crate) fn is_null(&self, raw: &str) -> bool {
        if self.options.null_value.is_empty() {
            raw.trim().is_empty()
        } else {
            raw == self.options.null_value || raw.trim().is_empty()
        }
    }

    /// Narrowest type that can hold this cell
    pub(crate) fn infer(&self, raw: &str) -> DataType {
        if self.is_null(raw) {
            return DataType::Null;
        }
        let trimmed = raw.trim();

        if parse_bool(trimmed).is_some() {
            DataType::Boolean
        } else if trimmed.parse::<i64>().is_ok() {
            DataType::Integer
        } else if parse_double(trimmed).is_some() {
            DataType::Double
        } else if self.parse_date(trimmed).is_some() {
            DataType::Date
        } else if self.parse_timestamp(trimmed).is_some() {
            DataType::Timestamp
        } else {
            DataType::String
        }
    }

    /// Convert a cell into a value of the column's type.
    ///
    /// Cells that do not fit the type become null; after a full inference
    /// scan this only happens for cells of `String` columns, which never fail.
    pub(crate) fn convert(&self, raw: &str, data_type: DataType) -> Value {
        if self.is_null(raw) {
            return Value::Null;
        }
        let trimmed = raw.trim();

        let value = match data_type {
            DataType::Null => None,
            DataType::Boolean => parse_bool(trimmed).map(Value::Boolean),
            DataType::Integer => trimmed.parse().ok().map(Value::Integer),
            DataType::Double => parse_double(trimmed).map(Value::Double),
            DataType::Date => self.parse_date(trimmed).map(Value::Date),
            DataType::Timestamp => self
                .parse_timestamp(trimmed)
                .or_else(|| {
                    self.parse_date(trimmed)
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .map(Value::Timestamp),
            DataType::String => Some(Value::String(raw.to_string())),
        };

        value.unwrap_or(Value::Null)
    }

    fn parse_date(&self, s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, &self.options.date_format).ok()
    }

    fn parse_timestamp(&self, s: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, &self.options.timestamp_format)
            .ok()
            .or_else(|| {
                ISO_TIMESTAMP_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Rust accepts `inf` and `NaN` as floats; cell text must contain a digit.
fn parse_double(s: &str) -> Option<f64> {
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
