//! chartscope - load a CSV file and show a sample of it

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use chartscope::config::{OutputFormat, ParseMode, ReadOptions};
use chartscope::output::{render_to_stdout, Inspection};
use chartscope::Session;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliParseMode {
    Failfast,
    Permissive,
    Dropmalformed,
}

impl From<CliParseMode> for ParseMode {
    fn from(m: CliParseMode) -> Self {
        match m {
            CliParseMode::Failfast => ParseMode::FailFast,
            CliParseMode::Permissive => ParseMode::Permissive,
            CliParseMode::Dropmalformed => ParseMode::DropMalformed,
        }
    }
}

/// Load a CSV file into a typed dataset and show a sample of it
#[derive(Parser, Debug)]
#[command(name = "chartscope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV file to load
    file: PathBuf,

    /// Treat the first line as data rather than column names
    #[arg(long)]
    no_header: bool,

    /// Keep every column as a string instead of inferring types
    #[arg(long)]
    no_infer_schema: bool,

    /// Field separator
    #[arg(long, default_value_t = ',')]
    sep: char,

    /// Cell text to read as null
    #[arg(long, default_value = "")]
    null_value: String,

    /// How to handle rows with the wrong number of fields
    #[arg(long, value_enum, default_value = "failfast")]
    mode: CliParseMode,

    /// Number of rows to show
    #[arg(short = 'n', long, default_value_t = 2)]
    head: usize,

    /// Show column names and types instead of rows
    #[arg(long)]
    schema: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Memory available for the loaded dataset (e.g. 4g, 512m)
    #[arg(long, default_value = "4g")]
    driver_memory: String,

    /// Largest sample that may be returned (0 = unlimited)
    #[arg(long, default_value = "4g")]
    max_result_size: String,
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if !cli.sep.is_ascii() {
        anyhow::bail!("separator must be an ASCII character, got {:?}", cli.sep);
    }
    let sep = cli.sep as u8;

    let session = Session::builder()
        .config("spark.driver.memory", &cli.driver_memory)
        .config("spark.driver.maxResultSize", &cli.max_result_size)
        .get_or_create()
        .context("Failed to start session")?;

    let options = ReadOptions::default()
        .with_header(!cli.no_header)
        .with_infer_schema(!cli.no_infer_schema)
        .with_delimiter(sep)
        .with_null_value(cli.null_value)
        .with_mode(cli.mode.into());

    let dataset = session
        .read()
        .options(options)
        .csv(&cli.file)
        .with_context(|| format!("Failed to load {}", cli.file.display()))?;

    let inspection = if cli.schema {
        Inspection::Schema
    } else {
        Inspection::Head(cli.head)
    };
    render_to_stdout(&dataset, inspection, cli.format.into())?;

    session.stop();
    Ok(())
}
