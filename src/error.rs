//! Error types for loading and inspecting datasets

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by sessions, readers and datasets
#[derive(Error, Debug)]
pub enum Error {
    /// The input path does not exist or cannot be read
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row has a different number of fields than the header
    #[error("line {line}: expected {expected} fields, found {found}")]
    Parse {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid reader option or session setting
    #[error("configuration error: {0}")]
    Config(String),

    /// The loaded dataset would not fit in the configured driver memory
    #[error("dataset needs about {estimated} bytes, driver memory is {limit} bytes")]
    MemoryLimit { estimated: u64, limit: u64 },

    /// Rows requested from the dataset exceed the configured result size
    #[error("result of about {estimated} bytes exceeds max result size of {limit} bytes")]
    ResultTooLarge { estimated: u64, limit: u64 },

    #[error("session has been stopped")]
    SessionStopped,

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
