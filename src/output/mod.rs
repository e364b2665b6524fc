//! Output formatting for inspection results

mod json;
mod terminal;

use std::io::IsTerminal;

use anyhow::Result;
use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::config::OutputFormat;
use crate::model::{Dataset, Row};

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a sample of rows taken from `dataset`
    fn render_sample(&self, dataset: &Dataset, rows: &[Row], writer: &mut dyn WriteColor)
        -> Result<()>;

    /// Render the dataset's column names and types
    fn render_schema(&self, dataset: &Dataset, writer: &mut dyn WriteColor) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// What to print for a dataset
#[derive(Debug, Clone, Copy)]
pub enum Inspection {
    /// The first `n` rows
    Head(usize),
    /// Column names and types
    Schema,
}

/// Render an inspection of `dataset` to stdout
pub fn render_to_stdout(dataset: &Dataset, inspection: Inspection, format: OutputFormat) -> Result<()> {
    let formatter = OutputFactory::create(format);
    let color = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(color);
    match inspection {
        Inspection::Head(n) => {
            let rows = dataset.head(n)?;
            formatter.render_sample(dataset, rows, &mut stdout)
        }
        Inspection::Schema => formatter.render_schema(dataset, &mut stdout),
    }
}
