//! JSON output format

use std::io::Write;

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;
use termcolor::WriteColor;

use crate::model::{Dataset, Row, Value};

use super::OutputFormatter;

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn write<T: Serialize>(&self, value: &T, writer: &mut dyn WriteColor) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, value)?;
        } else {
            serde_json::to_writer(&mut *writer, value)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonColumn<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    data_type: &'static str,
    nullable: bool,
}

#[derive(Serialize)]
struct JsonSample<'a> {
    count: usize,
    rows: Vec<IndexMap<&'a str, &'a Value>>,
}

impl OutputFormatter for JsonOutput {
    fn render_sample(
        &self,
        dataset: &Dataset,
        rows: &[Row],
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        let sample = JsonSample {
            count: dataset.count(),
            rows: rows.iter().map(|r| r.to_map(dataset.schema())).collect(),
        };
        self.write(&sample, writer)
    }

    fn render_schema(&self, dataset: &Dataset, writer: &mut dyn WriteColor) -> Result<()> {
        let columns: Vec<JsonColumn<'_>> = dataset
            .schema()
            .fields
            .iter()
            .map(|f| JsonColumn {
                name: &f.name,
                data_type: f.data_type.name(),
                nullable: f.nullable,
            })
            .collect();
        self.write(&columns, writer)
    }
}

#[cfg(test)]
mod tests {
    use termcolor::NoColor;

    use super::*;
    use crate::model::{DataType, Field, Schema};

    #[test]
    fn test_render_sample_as_objects() {
        let schema = Schema::new(vec![
            Field::new("rank", DataType::Integer),
            Field::new("streams", DataType::Double),
        ]);
        let ds = Dataset::new(
            schema,
            vec![
                Row::new(vec![Value::Integer(1), Value::Double(2.5)], 2),
                Row::new(vec![Value::Integer(2), Value::Null], 3),
            ],
        );

        let mut writer = NoColor::new(Vec::new());
        JsonOutput::compact()
            .render_sample(&ds, ds.rows(), &mut writer)
            .unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();

        assert_eq!(
            out.trim(),
            r#"{"count":2,"rows":[{"rank":1,"streams":2.5},{"rank":2,"streams":null}]}"#
        );
    }

    #[test]
    fn test_render_schema() {
        let ds = Dataset::new(
            Schema::new(vec![Field::new("date", DataType::Date).with_nullable(false)]),
            Vec::new(),
        );
        let mut writer = NoColor::new(Vec::new());
        JsonOutput::compact().render_schema(&ds, &mut writer).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out.trim(), r#"[{"name":"date","type":"date","nullable":false}]"#);
    }
}
