//! Table output for terminals

use std::io::Write;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::model::{Dataset, Row};

use super::OutputFormatter;

/// Box-drawn table output, with colored type names
pub struct TerminalOutput {
    type_color: ColorSpec,
}

impl TerminalOutput {
    pub fn new() -> Self {
        let mut type_color = ColorSpec::new();
        type_color.set_fg(Some(Color::Cyan));
        Self { type_color }
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render_sample(
        &self,
        dataset: &Dataset,
        rows: &[Row],
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        if dataset.schema().is_empty() {
            writeln!(writer, "(no columns)")?;
            return Ok(());
        }

        writeln!(writer, "{}", build_table(dataset, rows))?;

        if rows.len() < dataset.count() {
            writeln!(
                writer,
                "only showing top {} of {} rows",
                rows.len(),
                dataset.count()
            )?;
        }
        Ok(())
    }

    fn render_schema(&self, dataset: &Dataset, writer: &mut dyn WriteColor) -> Result<()> {
        writeln!(writer, "root")?;
        for field in &dataset.schema().fields {
            write!(writer, " |-- {}: ", field.name)?;
            writer.set_color(&self.type_color)?;
            write!(writer, "{}", field.data_type)?;
            writer.reset()?;
            writeln!(writer, " (nullable = {})", field.nullable)?;
        }
        Ok(())
    }
}

/// Build a formatted table: header row, then one line per row
fn build_table(dataset: &Dataset, rows: &[Row]) -> String {
    let mut builder = Builder::default();
    builder.push_record(dataset.columns());
    for row in rows {
        builder.push_record(row.values.iter().map(|v| v.display().into_owned()));
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}
