//! Arrow export of a loaded dataset

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType as ArrowType, Field as ArrowField, Schema as ArrowSchema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::error::Result;

use super::schema::DataType;
use super::table::{Dataset, Value};

fn arrow_type(data_type: DataType) -> ArrowType {
    match data_type {
        DataType::Null => ArrowType::Null,
        DataType::Boolean => ArrowType::Boolean,
        DataType::Integer => ArrowType::Int64,
        DataType::Double => ArrowType::Float64,
        DataType::Date => ArrowType::Date32,
        DataType::Timestamp => ArrowType::Timestamp(TimeUnit::Microsecond, None),
        DataType::String => ArrowType::Utf8,
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

impl Dataset {
    /// Arrow schema matching this dataset's columns
    pub fn arrow_schema(&self) -> ArrowSchema {
        let fields: Vec<ArrowField> = self
            .schema()
            .fields
            .iter()
            .map(|f| ArrowField::new(&f.name, arrow_type(f.data_type), f.nullable))
            .collect();
        ArrowSchema::new(fields)
    }

    /// Convert the dataset into a single Arrow record batch
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = self
            .schema()
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| self.column_array(idx, field.data_type))
            .collect();

        let batch = RecordBatch::try_new(Arc::new(self.arrow_schema()), columns)?;
        Ok(batch)
    }

    fn column_array(&self, idx: usize, data_type: DataType) -> ArrayRef {
        let values = self.rows().iter().map(|row| row.get(idx).unwrap_or(&Value::Null));

        match data_type {
            DataType::Boolean => Arc::new(
                values
                    .map(|v| match v {
                        Value::Boolean(b) => Some(*b),
                        _ => None,
                    })
                    .collect::<BooleanArray>(),
            ),
            DataType::Integer => Arc::new(values.map(Value::as_i64).collect::<Int64Array>()),
            DataType::Double => Arc::new(values.map(Value::as_f64).collect::<Float64Array>()),
            DataType::Date => Arc::new(
                values
                    .map(|v| match v {
                        Value::Date(d) => Some((*d - epoch()).num_days() as i32),
                        _ => None,
                    })
                    .collect::<Date32Array>(),
            ),
            DataType::Timestamp => Arc::new(
                values
                    .map(|v| match v {
                        Value::Timestamp(ts) => Some(ts.and_utc().timestamp_micros()),
                        Value::Date(d) => d
                            .and_hms_opt(0, 0, 0)
                            .map(|ts| ts.and_utc().timestamp_micros()),
                        _ => None,
                    })
                    .collect::<TimestampMicrosecondArray>(),
            ),
            DataType::Null | DataType::String => Arc::new(
                values
                    .map(|v| match v {
                        Value::Null => None,
                        other => Some(other.display().into_owned()),
                    })
                    .collect::<StringArray>(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::Array;

    use super::*;
    use crate::model::{Field, Row, Schema};

    #[test]
    fn test_to_record_batch() {
        let schema = Schema::new(vec![
            Field::new("rank", DataType::Integer),
            Field::new("streams", DataType::Double),
            Field::new("date", DataType::Date),
            Field::new("title", DataType::String),
        ]);
        let date = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        let rows = vec![
            Row::new(
                vec![
                    Value::Integer(1),
                    Value::Double(1371493.0),
                    Value::Date(date),
                    "Chantaje".into(),
                ],
                2,
            ),
            Row::new(vec![Value::Integer(2), Value::Null, Value::Null, Value::Null], 3),
        ];
        let batch = Dataset::new(schema, rows).to_record_batch().unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 4);
        assert_eq!(batch.schema().field(0).data_type(), &ArrowType::Int64);
        assert_eq!(batch.column(1).null_count(), 1);

        let dates = batch
            .column(2)
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        assert_eq!(dates.value(0), 17167);
    }
}
